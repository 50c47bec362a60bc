//! Sources for the "describe yourself" text of the documented subsystem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::pages::Category;

#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("No documentation available for {0}")]
    Unavailable(Category),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status} for {category}: {stderr}")]
    CommandFailed {
        program: String,
        category: Category,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("{program} printed invalid UTF-8 for {category}")]
    InvalidUtf8 { program: String, category: Category },
}

/// Query surface returning the raw documentation text of one category.
pub trait DescribeSource: Send + Sync {
    fn describe(&self, category: Category) -> Result<String, DescribeError>;
}

/// Whitespace-only text counts as a missing category.
fn non_empty(category: Category, text: String) -> Result<String, DescribeError> {
    if text.trim().is_empty() {
        Err(DescribeError::Unavailable(category))
    } else {
        Ok(text)
    }
}

/// Reads `<dir>/<category>.txt` files dumped from the documented subsystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.dir.join(format!("{}.txt", category.name()))
    }
}

impl DescribeSource for DirectorySource {
    fn describe(&self, category: Category) -> Result<String, DescribeError> {
        let path = self.path_for(category);
        if !path.exists() {
            return Err(DescribeError::Unavailable(category));
        }
        debug!("reading {category} from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .map_err(|source| DescribeError::Read { path, source })?;
        non_empty(category, text)
    }
}

/// Runs `program args... <category>` and captures its standard output.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Builds a source from a command line given as a list, program first.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl DescribeSource for CommandSource {
    fn describe(&self, category: Category) -> Result<String, DescribeError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(category.name());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!("running {} for {category}", self.program);
        let output = command.output().map_err(|source| DescribeError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(DescribeError::CommandFailed {
                program: self.program.clone(),
                category,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|_| DescribeError::InvalidUtf8 {
            program: self.program.clone(),
            category,
        })?;
        non_empty(category, text)
    }
}

/// In-memory source.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    texts: HashMap<Category, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: Category, text: impl Into<String>) -> Self {
        self.texts.insert(category, text.into());
        self
    }
}

impl DescribeSource for StaticSource {
    fn describe(&self, category: Category) -> Result<String, DescribeError> {
        let text = self
            .texts
            .get(&category)
            .cloned()
            .ok_or(DescribeError::Unavailable(category))?;
        non_empty(category, text)
    }
}
