use clap::{Args, Parser, Subcommand};
use rtdoc_engine::Category;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rtdoc")]
#[command(author, version)]
#[command(about = "Converts runtime self-description text into reStructuredText")]
#[command(after_help = "\
EXAMPLES:

    # Convert a describe dump to stdout
    rtdoc convert passes.txt --header-level 2

    # Convert from stdin
    describe-tool passes | rtdoc convert

    # Generate every reference page of a docs directory
    rtdoc generate --docs-dir docs --source-command describe-tool --list

CONFIGURATION:

rtdoc reads ~/.config/rtdoc/config.toml unless --config is given.
Relative paths in it are resolved against the docs directory.

    templates_dir = \".\"
    output_dir = \"gen\"
    header_level = 2
    source_dir = \"dumps\"
    categories = [\"passes\", \"options\"]")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (RUST_LOG is honoured otherwise)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one describe text to RST on stdout
    Convert {
        /// Input file (stdin if not provided or "-")
        input: Option<PathBuf>,

        /// Level of the outermost section headers
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        header_level: u32,
    },

    /// Generate the reference pages of every category
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Base directory for relative template, output and source paths
    #[arg(long, default_value = ".")]
    pub docs_dir: PathBuf,

    /// Directory of <category>.txt describe dumps
    #[arg(long, conflicts_with = "source_command")]
    pub source_dir: Option<PathBuf>,

    /// Command printing describe text, called with the category name appended
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    pub source_command: Option<Vec<String>>,

    /// Category to generate (repeatable, defaults to the configured list)
    #[arg(long = "category")]
    pub categories: Vec<Category>,

    /// Level of the outermost section headers on each page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub header_level: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_defaults() {
        let cli = Cli::try_parse_from(["rtdoc", "convert"]).unwrap();
        match cli.command {
            Commands::Convert {
                input,
                header_level,
            } => {
                assert!(input.is_none());
                assert_eq!(header_level, 1);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_convert_rejects_level_zero() {
        assert!(Cli::try_parse_from(["rtdoc", "convert", "--header-level", "0"]).is_err());
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "rtdoc",
            "generate",
            "--docs-dir",
            "docs",
            "--category",
            "passes",
            "--category",
            "options",
            "--source-command",
            "describe-tool",
            "--list",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.docs_dir, PathBuf::from("docs"));
        assert_eq!(args.categories, vec![Category::Passes, Category::Options]);
        assert_eq!(
            args.source_command,
            Some(vec!["describe-tool".to_string(), "--list".to_string()])
        );
    }

    #[test]
    fn test_generate_source_options_conflict() {
        let result = Cli::try_parse_from([
            "rtdoc",
            "generate",
            "--source-dir",
            "dumps",
            "--source-command",
            "tool",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["rtdoc", "generate", "--category", "targets"]).is_err());
    }
}
