/// A single input line with its local facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    /// Line text without the line terminator.
    pub text: &'a str,
    /// Whether the line is whitespace only.
    pub is_blank: bool,
}

/// Returns an iterator over the lines of `text`.
///
/// Splits on `\n` only, so a trailing newline yields a final blank line. A
/// trailing `\r` is stripped from every line.
pub fn lines_with_numbers(text: &str) -> impl Iterator<Item = LineRef<'_>> {
    text.split('\n').enumerate().map(|(idx, raw)| {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        LineRef {
            number: idx + 1,
            text,
            is_blank: text.trim().is_empty(),
        }
    })
}
