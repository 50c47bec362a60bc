/// Callout kinds recognized at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmonitionKind {
    Note,
    Warning,
}

impl AdmonitionKind {
    pub const ALL: [AdmonitionKind; 2] = [AdmonitionKind::Note, AdmonitionKind::Warning];

    /// Indentation that keeps a line inside the directive body.
    pub const BODY_INDENT: &'static str = "   ";

    /// Literal prefix that opens this kind of block in the source text.
    pub fn prefix(self) -> &'static str {
        match self {
            AdmonitionKind::Note => "NOTE: ",
            AdmonitionKind::Warning => "WARNING: ",
        }
    }

    /// Directive line that opens the block in the output.
    pub fn directive(self) -> &'static str {
        match self {
            AdmonitionKind::Note => ".. note::",
            AdmonitionKind::Warning => ".. warning::",
        }
    }

    /// Splits a line into its admonition kind and the remaining text.
    pub fn strip(line: &str) -> Option<(AdmonitionKind, &str)> {
        Self::ALL
            .into_iter()
            .find_map(|kind| line.strip_prefix(kind.prefix()).map(|rest| (kind, rest)))
    }

    /// First body line: the text with its first character uppercased.
    pub fn opening_line(text: &str) -> String {
        let mut chars = text.chars();
        let mut line = String::from(Self::BODY_INDENT);
        if let Some(first) = chars.next() {
            line.extend(first.to_uppercase());
            line.push_str(chars.as_str());
        }
        line
    }

    /// Any later line of the same block.
    pub fn continuation_line(line: &str) -> String {
        format!("{}{line}", Self::BODY_INDENT)
    }
}
