use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Category names generated when the config does not list any.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["architectures", "options", "passes", "resources"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {message}")]
    ConfigInvalidError {
        config_path: PathBuf,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the `ref_<category>.rst.template` files.
    pub templates_dir: PathBuf,
    /// Directory the generated pages are written to.
    pub output_dir: PathBuf,
    /// Level of the outermost section headers on each page.
    pub header_level: usize,
    /// Directory of `<category>.txt` describe dumps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    /// Command printing the describe text, called with the category name appended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_command: Option<Vec<String>>,
    /// Replacement for the raw-HTML wrapper pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitizer_pattern: Option<String>,
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("."),
            output_dir: PathBuf::from("gen"),
            header_level: 2,
            source_dir: None,
            source_command: None,
            sanitizer_pattern: None,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Err(message) = config.validate() {
            return Err(ConfigError::ConfigInvalidError {
                config_path: config_path.to_path_buf(),
                message,
            });
        }

        // Expand shell variables and tilde in the loaded paths
        config.templates_dir =
            Self::expand_path(&config.templates_dir).unwrap_or(config.templates_dir);
        config.output_dir = Self::expand_path(&config.output_dir).unwrap_or(config.output_dir);
        config.source_dir = config
            .source_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/rtdoc");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Returns a copy with every relative directory joined onto `base`.
    pub fn resolve(&self, base: &Path) -> Self {
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        Self {
            templates_dir: join(&self.templates_dir),
            output_dir: join(&self.output_dir),
            source_dir: self.source_dir.as_deref().map(join),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.header_level == 0 {
            return Err("header_level must be at least 1".to_string());
        }
        if self.source_dir.is_some() && self.source_command.is_some() {
            return Err("source_dir and source_command are mutually exclusive".to_string());
        }
        if self.source_command.as_ref().is_some_and(|c| c.is_empty()) {
            return Err("source_command must name a program".to_string());
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
