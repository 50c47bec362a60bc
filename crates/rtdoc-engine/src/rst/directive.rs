use std::sync::OnceLock;

use regex::Regex;

/// Directives whose body is kept verbatim instead of being converted.
const LITERAL_DIRECTIVES: [&str; 6] = [
    "code",
    "code-block",
    "sourcecode",
    "raw",
    "math",
    "parsed-literal",
];

/// A slice of the annotated text, either Markdown or an embedded RST directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Markdown(String),
    Directive(Directive<'a>),
}

/// An RST directive embedded in Markdown, such as `.. note::`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive<'a> {
    /// The `.. name:: arguments` line.
    pub head: &'a str,
    /// Dedented `:option: value` lines directly below the head.
    pub options: Vec<String>,
    /// Dedented body text.
    pub body: String,
}

impl Directive<'_> {
    pub fn name(&self) -> &str {
        self.head
            .trim_start_matches(".. ")
            .split("::")
            .next()
            .unwrap_or_default()
    }

    /// Whether the body must not be converted from Markdown.
    pub fn is_literal(&self) -> bool {
        LITERAL_DIRECTIVES.contains(&self.name())
    }

    fn parse<'a>(head: &'a str, body_lines: &[&str]) -> Directive<'a> {
        let dedented = dedent(body_lines);
        let mut lines = dedented.iter().map(String::as_str).peekable();

        let mut options = vec![];
        while let Some(line) = lines.next_if(|line| is_option(line)) {
            options.push(line.to_string());
        }
        while lines.next_if(|line| line.trim().is_empty()).is_some() {}

        Directive {
            head,
            options,
            body: lines.collect::<Vec<_>>().join("\n"),
        }
    }
}

fn directive_re() -> &'static Regex {
    static DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE_REGEX.get_or_init(|| {
        Regex::new(r"^\.\. [A-Za-z][\w:+.-]*::(?:\s.*)?$").expect("Invalid directive regex")
    })
}

fn is_option(line: &str) -> bool {
    static OPTION_REGEX: OnceLock<Regex> = OnceLock::new();
    OPTION_REGEX
        .get_or_init(|| Regex::new(r"^:[\w-]+:(?:\s.*)?$").expect("Invalid option regex"))
        .is_match(line)
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    ["```", "~~~"]
        .into_iter()
        .find(|marker| trimmed.starts_with(marker))
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Strips the common leading whitespace of all non-blank lines.
fn dedent(lines: &[&str]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[common..].to_string()
            }
        })
        .collect()
}

/// Splits annotated text into Markdown runs and embedded directives.
///
/// A directive starts at a `.. name::` line in column zero and extends over
/// the following indented or blank lines. Trailing blank lines belong to the
/// Markdown that follows. Lines inside fenced code are never directives.
pub(crate) fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut segments = vec![];
    let mut markdown: Vec<&str> = vec![];
    let mut fence: Option<&str> = None;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if let Some(marker) = fence {
            if line.trim_start().starts_with(marker) {
                fence = None;
            }
            markdown.push(line);
            idx += 1;
            continue;
        }

        if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
            markdown.push(line);
            idx += 1;
            continue;
        }

        if !directive_re().is_match(line) {
            markdown.push(line);
            idx += 1;
            continue;
        }

        if !markdown.is_empty() {
            segments.push(Segment::Markdown(markdown.join("\n")));
            markdown.clear();
        }

        let mut end = idx + 1;
        while end < lines.len()
            && (lines[end].trim().is_empty() || lines[end].starts_with([' ', '\t']))
        {
            end += 1;
        }
        while end > idx + 1 && lines[end - 1].trim().is_empty() {
            end -= 1;
        }

        segments.push(Segment::Directive(Directive::parse(
            line,
            &lines[idx + 1..end],
        )));
        idx = end;
    }

    if !markdown.is_empty() {
        segments.push(Segment::Markdown(markdown.join("\n")));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_markdown_is_one_segment() {
        assert_eq!(
            split_segments("a\n\nb"),
            vec![Segment::Markdown("a\n\nb".to_string())]
        );
    }

    #[test]
    fn note_block_is_split_out() {
        let segments = split_segments("## T\n\n.. note::\n   Body\n   more\n\nafter\n");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Markdown("## T\n".to_string()));
        assert_eq!(
            segments[1],
            Segment::Directive(Directive {
                head: ".. note::",
                options: vec![],
                body: "Body\nmore".to_string(),
            })
        );
        assert_eq!(segments[2], Segment::Markdown("\nafter\n".to_string()));
    }

    #[test]
    fn options_are_separated_from_body() {
        let segments = split_segments(".. image:: a.png\n   :alt: A\n\n   caption");
        let Segment::Directive(directive) = &segments[0] else {
            panic!("expected directive");
        };
        assert_eq!(directive.name(), "image");
        assert_eq!(directive.options, vec![":alt: A".to_string()]);
        assert_eq!(directive.body, "caption");
    }

    #[test]
    fn body_keeps_relative_indentation() {
        let segments = split_segments(".. warning::\n   top\n\n       nested\n");
        let Segment::Directive(directive) = &segments[0] else {
            panic!("expected directive");
        };
        assert_eq!(directive.body, "top\n\n    nested");
    }

    #[test]
    fn directive_lines_in_fences_are_markdown() {
        let text = "```\n.. note::\n   x\n```";
        assert_eq!(
            split_segments(text),
            vec![Segment::Markdown(text.to_string())]
        );
    }

    #[test]
    fn indented_directive_is_markdown() {
        let text = "  .. note::\n     x";
        assert_eq!(
            split_segments(text),
            vec![Segment::Markdown(text.to_string())]
        );
    }

    #[test]
    fn literal_directives() {
        let segments = split_segments(".. code-block:: c\n\n   int x;");
        let Segment::Directive(directive) = &segments[0] else {
            panic!("expected directive");
        };
        assert!(directive.is_literal());
        assert_eq!(directive.body, "int x;");
    }
}
