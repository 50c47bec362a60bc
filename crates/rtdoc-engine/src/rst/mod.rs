//! # Markdown to RST
//!
//! The secondary converter of the pipeline: lightweight Markdown (emphasis,
//! code spans, lists, links, code blocks) becomes reStructuredText.
//!
//! `MarkdownToRst` follows the conventions of the converter the generated
//! pages have always been built with, including its habit of wrapping
//! anything that looks like an HTML tag in the `raw-html-m2r` role. The
//! sanitizer undoes that wrapping for placeholder tokens afterwards.
//!
//! Embedded RST directives (`.. note::` and friends) are split out before
//! Markdown parsing; their bodies are converted recursively and indented
//! back under the directive.

mod directive;
mod render;
mod writer;

use log::debug;

use crate::convert::ConvertError;
use directive::{Directive, Segment, split_segments};
use render::{BLOCK_INDENT, RenderContext, render_markdown};

/// Role the converter wraps inline HTML in.
pub const RAW_HTML_ROLE: &str = "raw-html-m2r";

/// Role declaration prepended when inline HTML was wrapped.
pub const RAW_HTML_ROLE_PROLOG: &str = ".. role:: raw-html-m2r(raw)\n   :format: html\n\n";

/// Deepest nesting of directives inside directive bodies.
pub const MAX_DIRECTIVE_DEPTH: usize = 16;

/// Converts lightweight markup text into RST.
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, text: &str) -> Result<String, ConvertError>;
}

/// Markdown to RST converter built on `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownToRst;

impl MarkupConverter for MarkdownToRst {
    fn convert(&self, text: &str) -> Result<String, ConvertError> {
        let mut ctx = RenderContext::default();
        let body = convert_segments(text, &mut ctx, 0)?;

        let mut rst = String::new();
        if ctx.uses_raw_html {
            rst.push_str(RAW_HTML_ROLE_PROLOG);
        }
        rst.push_str(&body);
        for image in &ctx.images {
            rst.push_str("\n\n");
            rst.push_str(&image.definition());
        }
        rst.push('\n');

        debug!(
            "converted {} bytes of markdown into {} bytes of rst",
            text.len(),
            rst.len()
        );
        Ok(clean_escaped_spaces(&rst))
    }
}

fn convert_segments(
    text: &str,
    ctx: &mut RenderContext,
    depth: usize,
) -> Result<String, ConvertError> {
    if depth > MAX_DIRECTIVE_DEPTH {
        return Err(ConvertError::Markup(format!(
            "directives nested deeper than {MAX_DIRECTIVE_DEPTH} levels"
        )));
    }

    let mut parts = vec![];
    for segment in split_segments(text) {
        let part = match segment {
            Segment::Markdown(markdown) => render_markdown(&markdown, ctx),
            Segment::Directive(directive) => convert_directive(&directive, ctx, depth)?,
        };
        if !part.trim().is_empty() {
            parts.push(part);
        }
    }
    Ok(parts.join("\n\n"))
}

fn convert_directive(
    directive: &Directive<'_>,
    ctx: &mut RenderContext,
    depth: usize,
) -> Result<String, ConvertError> {
    let mut lines = vec![directive.head.to_string()];
    for option in &directive.options {
        lines.push(format!("{BLOCK_INDENT}{option}"));
    }

    let content = if directive.is_literal() {
        directive.body.clone()
    } else {
        convert_segments(&directive.body, ctx, depth + 1)?
    };
    if !content.trim().is_empty() {
        lines.push(String::new());
        for line in content.lines() {
            if line.trim().is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{BLOCK_INDENT}{line}"));
            }
        }
    }
    Ok(lines.join("\n"))
}

/// Drops the escaped spaces that are redundant next to real whitespace.
fn clean_escaped_spaces(rst: &str) -> String {
    let cleaned = rst
        .replace("\\ \n", "\n")
        .replace("\n\\ ", "\n")
        .replace(" \\ ", " ")
        .replace("\\  ", " ")
        .replace("\\ .", ".");
    match cleaned.strip_prefix("\\ ") {
        Some(rest) => rest.to_string(),
        None => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(text: &str) -> String {
        MarkdownToRst.convert(text).unwrap()
    }

    #[test]
    fn escaped_spaces_next_to_whitespace_are_dropped() {
        assert_eq!(convert("an *em* word"), "an *em* word\n");
        assert_eq!(convert("*start* and end *here*"), "*start* and end *here*\n");
        assert_eq!(convert("ends with `code`."), "ends with ``code``.\n");
    }

    #[test]
    fn escaped_spaces_between_words_stay() {
        assert_eq!(convert("a`b`c"), "a\\ ``b``\\ c\n");
    }

    #[test]
    fn inline_html_declares_the_role() {
        assert_eq!(
            convert("the <platform> tag"),
            ".. role:: raw-html-m2r(raw)\n   :format: html\n\nthe :raw-html-m2r:`<platform>` tag\n"
        );
    }

    #[test]
    fn note_body_is_converted_and_reindented() {
        let text = "\n## Targets\n\n.. note::\n   Use `x`.\n   more detail.\n";
        assert_eq!(
            convert(text),
            "Targets\n-------\n\n.. note::\n\n   Use ``x``.\n   more detail.\n"
        );
    }

    #[test]
    fn literal_directive_body_is_verbatim() {
        let text = ".. code-block:: c\n\n   int *p;\n";
        assert_eq!(convert(text), ".. code-block:: c\n\n   int *p;\n");
    }

    #[test]
    fn image_definitions_are_appended() {
        assert_eq!(
            convert("![](a.png) text"),
            "|image-1| text\n\n.. |image-1| image:: a.png\n"
        );
    }

    #[test]
    fn runaway_directive_nesting_is_an_error() {
        let mut text = String::from("x");
        for _ in 0..=MAX_DIRECTIVE_DEPTH + 1 {
            let indented: Vec<String> = text.lines().map(|l| format!("   {l}")).collect();
            text = format!(".. note::\n{}", indented.join("\n"));
        }
        let err = MarkdownToRst.convert(&text).unwrap_err();
        assert!(matches!(err, ConvertError::Markup(_)));
    }

    #[test]
    fn empty_input() {
        assert_eq!(convert(""), "\n");
    }
}
