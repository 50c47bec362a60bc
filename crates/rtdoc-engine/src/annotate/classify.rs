use super::admonition::AdmonitionKind;

/// Classification of the first line of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass<'a> {
    SectionHeader { title: &'a str },
    Admonition { kind: AdmonitionKind, text: &'a str },
    Body,
}

/// Section title delimiters, `* Title *`.
pub struct HeaderMarker;

impl HeaderMarker {
    pub const OPEN: &'static str = "* ";
    pub const CLOSE: &'static str = " *";

    /// Returns the title if the whole line is a marked header.
    ///
    /// The markers must not overlap, so `"* *"` is body text.
    pub fn title(line: &str) -> Option<&str> {
        line.strip_prefix(Self::OPEN)?.strip_suffix(Self::CLOSE)
    }
}

/// Classifies an already dedented line that starts a block.
pub fn classify(line: &str) -> BlockClass<'_> {
    // "* *" shares its middle space between both markers and stays body text.
    if let Some(title) = HeaderMarker::title(line) {
        BlockClass::SectionHeader { title }
    } else if let Some((kind, text)) = AdmonitionKind::strip(line) {
        BlockClass::Admonition { kind, text }
    } else {
        BlockClass::Body
    }
}
