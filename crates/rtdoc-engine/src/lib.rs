pub mod annotate;
pub mod convert;
pub mod describe;
pub mod io;
pub mod pages;
pub mod rst;
pub mod sanitize;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{ConvertError, DocConverter, docs_to_rst};
pub use describe::{CommandSource, DescribeError, DescribeSource, DirectorySource, StaticSource};
pub use pages::{Category, PageError, PageGenerator, fill_template};
pub use rst::{MarkdownToRst, MarkupConverter};
pub use sanitize::{RAW_HTML_WRAPPER_PATTERN, SanitizeError, Sanitizer};
