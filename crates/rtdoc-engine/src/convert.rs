//! The full conversion: annotation, Markdown to RST, sanitizing.

use log::debug;

use crate::annotate::annotate;
use crate::rst::{MarkdownToRst, MarkupConverter};
use crate::sanitize::{SanitizeError, Sanitizer};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Header level must be at least 1, got {0}")]
    InvalidHeaderLevel(usize),
    #[error("Markup conversion failed: {0}")]
    Markup(String),
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}

/// Runtime documentation to RST converter.
///
/// Holds no per-call state and may be shared across threads.
pub struct DocConverter {
    markup: Box<dyn MarkupConverter>,
    sanitizer: Sanitizer,
}

impl DocConverter {
    pub fn new(markup: Box<dyn MarkupConverter>, sanitizer: Sanitizer) -> Self {
        Self { markup, sanitizer }
    }

    /// Uses the bundled converter with a custom wrapper pattern.
    pub fn with_sanitizer_pattern(pattern: &str) -> Result<Self, ConvertError> {
        Ok(Self::new(Box::new(MarkdownToRst), Sanitizer::new(pattern)?))
    }

    /// Converts `text`, rendering outermost sections at `header_level`.
    ///
    /// The result ends in exactly one newline. Errors of the markup converter
    /// are returned unchanged.
    pub fn convert(&self, text: &str, header_level: usize) -> Result<String, ConvertError> {
        if header_level == 0 {
            return Err(ConvertError::InvalidHeaderLevel(header_level));
        }

        let annotated = annotate(text, header_level);
        debug!(
            "annotated {} input lines into {} bytes",
            text.lines().count(),
            annotated.len()
        );

        let rst = self.markup.convert(&annotated)?;
        let sanitized = self.sanitizer.sanitize(&rst);

        let trimmed = sanitized.trim_start_matches(['\n', '\r']).trim_end();
        let mut out = String::with_capacity(trimmed.len() + 1);
        out.push_str(trimmed);
        out.push('\n');
        Ok(out)
    }
}

impl Default for DocConverter {
    fn default() -> Self {
        Self::new(Box::new(MarkdownToRst), Sanitizer::default())
    }
}

/// Converts runtime documentation text into RST with the default pipeline.
pub fn docs_to_rst(text: &str, header_level: usize) -> Result<String, ConvertError> {
    DocConverter::default().convert(text, header_level)
}
