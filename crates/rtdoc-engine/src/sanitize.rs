//! Removes the raw-HTML role wrapper the Markdown converter puts around
//! angle-bracket placeholder tokens.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Wrapper emitted around inline HTML: an optional escaped space, the role,
/// the backtick-delimited payload, an optional escaped space.
pub const RAW_HTML_WRAPPER_PATTERN: &str = r"(?:\\ )?:raw-html-m2r:`([^`]+)`(?:\\ )?";

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("Invalid sanitizer pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Sanitizer pattern has no capture group for the payload: {0}")]
    MissingPayloadGroup(String),
}

/// Targeted textual repair of raw-HTML wrappers.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    pattern: Regex,
}

impl Sanitizer {
    /// Builds a sanitizer from a pattern whose first capture group is the payload.
    pub fn new(pattern: &str) -> Result<Self, SanitizeError> {
        let pattern = Regex::new(pattern)?;
        if pattern.captures_len() < 2 {
            return Err(SanitizeError::MissingPayloadGroup(
                pattern.as_str().to_string(),
            ));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether `text` contains at least one wrapper.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Replaces every wrapper with its payload. Other text is left untouched.
    ///
    /// Replacement repeats until no wrapper is left, so a payload that itself
    /// completes a wrapper is unwrapped too and the result is a fixed point.
    pub fn sanitize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        loop {
            let next = match self.pattern.replace_all(&out, "${1}") {
                Cow::Borrowed(_) => break,
                Cow::Owned(next) => next,
            };
            // A pattern whose payload is the whole match rewrites nothing.
            if next == *out {
                break;
            }
            out = Cow::Owned(next);
        }
        out
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        static DEFAULT_REGEX: OnceLock<Regex> = OnceLock::new();
        let pattern = DEFAULT_REGEX
            .get_or_init(|| Regex::new(RAW_HTML_WRAPPER_PATTERN).expect("Invalid wrapper regex"));
        Self {
            pattern: pattern.clone(),
        }
    }
}
