mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Commands, GenerateArgs};
use log::{LevelFilter, debug, error, info};
use rtdoc_config::Config;
use rtdoc_engine::{
    Category, CommandSource, DescribeSource, DirectorySource, DocConverter, PageGenerator, io,
};
use std::io::{Read, Write};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            header_level,
        } => convert(&config, input.as_deref(), header_level as usize),
        Commands::Generate(args) => generate(config, args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

/// Explicit `--config` must exist; the user config is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?
            .with_context(|| format!("Config file '{}' not found", path.display())),
        None => {
            let config = Config::load().context("Failed to load user config file")?;
            match config {
                Some(config) => {
                    debug!("Using config from: {}", Config::config_path().display());
                    Ok(config)
                }
                None => {
                    debug!("Using default config");
                    Ok(Config::default())
                }
            }
        }
    }
}

fn build_converter(config: &Config) -> Result<DocConverter> {
    match &config.sanitizer_pattern {
        Some(pattern) => DocConverter::with_sanitizer_pattern(pattern)
            .with_context(|| format!("Invalid sanitizer_pattern '{pattern}'")),
        None => Ok(DocConverter::default()),
    }
}

fn convert(config: &Config, input: Option<&Path>, header_level: usize) -> Result<()> {
    let text = match input {
        Some(path) if path != Path::new("-") => io::read_file(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let rst = build_converter(config)?
        .convert(&text, header_level)
        .context("Conversion failed")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rst.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn generate(mut config: Config, args: GenerateArgs) -> Result<()> {
    if let Some(dir) = args.source_dir {
        config.source_dir = Some(dir);
        config.source_command = None;
    }
    if let Some(command) = args.source_command {
        config.source_command = Some(command);
        config.source_dir = None;
    }
    if let Some(level) = args.header_level {
        config.header_level = level as usize;
    }
    if let Err(message) = config.validate() {
        bail!("Invalid configuration: {message}");
    }

    let config = config.resolve(&args.docs_dir);
    io::validate_dir(&config.templates_dir).with_context(|| {
        format!(
            "Templates directory '{}' is invalid",
            config.templates_dir.display()
        )
    })?;

    let categories = if args.categories.is_empty() {
        config
            .categories
            .iter()
            .map(|name| name.parse::<Category>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()
            .context("Invalid categories in config")?
    } else {
        args.categories
    };

    let source = describe_source(&config, &args.docs_dir)?;
    let generator = PageGenerator::new(
        &config.templates_dir,
        &config.output_dir,
        config.header_level,
        build_converter(&config)?,
    );

    let results = generator.generate_all(source.as_ref(), &categories);
    let mut failed = 0;
    for (category, result) in &results {
        match result {
            Ok(path) => info!("{category}: wrote {}", path.display()),
            Err(e) => {
                error!("{category}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} categories failed", results.len());
    }
    Ok(())
}

fn describe_source(config: &Config, docs_dir: &Path) -> Result<Box<dyn DescribeSource>> {
    if let Some(command) = &config.source_command {
        let source = CommandSource::from_command_line(command)
            .context("source_command must name a program")?
            .with_working_dir(docs_dir);
        return Ok(Box::new(source));
    }
    if let Some(dir) = &config.source_dir {
        return Ok(Box::new(DirectorySource::new(dir.clone())));
    }
    bail!("No describe source: pass --source-dir or --source-command, or set one in the config")
}
