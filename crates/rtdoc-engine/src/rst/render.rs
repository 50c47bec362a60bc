use log::debug;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use super::{RAW_HTML_ROLE, clean_escaped_spaces};
use super::writer::RstOutput;

/// Underline characters by heading level.
const HEADING_MARKS: [char; 6] = ['=', '-', '^', '~', '"', '#'];

/// Indentation of directive bodies and block quotes.
pub(crate) const BLOCK_INDENT: &str = "   ";

/// Image substitution collected while rendering, emitted at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageDef {
    pub name: String,
    pub url: String,
    pub alt: String,
}

impl ImageDef {
    pub fn definition(&self) -> String {
        let mut def = format!(".. |{}| image:: {}", self.name, self.url);
        if !self.alt.is_empty() {
            def.push_str(&format!("\n{BLOCK_INDENT}:alt: {}", self.alt));
        }
        def
    }
}

/// State shared by every Markdown fragment of one conversion.
#[derive(Debug, Default)]
pub(crate) struct RenderContext {
    /// Whether inline HTML was wrapped in the raw role.
    pub uses_raw_html: bool,
    pub images: Vec<ImageDef>,
}

/// Verbatim zones: no escaping, every line kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawZone {
    Code,
    Html,
}

#[derive(Debug)]
struct OpenLink {
    link_type: LinkType,
    dest_url: String,
}

struct Renderer<'c> {
    out: RstOutput,
    ctx: &'c mut RenderContext,
    /// Open lists, with the start number of ordered ones.
    lists: Vec<Option<u64>>,
    links: Vec<OpenLink>,
    images: Vec<String>,
    raw: Option<RawZone>,
    row_cell: usize,
}

/// Renders one Markdown fragment as RST.
pub(crate) fn render_markdown(markdown: &str, ctx: &mut RenderContext) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut renderer = Renderer {
        out: RstOutput::default(),
        ctx,
        lists: vec![],
        links: vec![],
        images: vec![],
        raw: None,
        row_cell: 0,
    };
    for event in parser {
        renderer.event(event);
    }
    renderer.out.finish()
}

/// Escapes characters RST would read as inline markup.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '`' | '|') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Trims captured inline text, dropping `\ ` escaped spaces at either end.
///
/// A plain `trim` would eat the space of a trailing `\ ` and leave a lone
/// backslash. Escaped backslashes (`\\`) at the end are kept.
pub(crate) fn trim_inline(text: &str) -> &str {
    let mut start = text;
    loop {
        let trimmed = start.trim_start();
        match trimmed.strip_prefix("\\ ") {
            Some(rest) => start = rest,
            None => {
                start = trimmed;
                break;
            }
        }
    }

    let mut end = start;
    loop {
        let trimmed = end.trim_end();
        if trimmed.len() == end.len() {
            break;
        }
        let backslashes = trimmed.len() - trimmed.trim_end_matches('\\').len();
        end = if backslashes % 2 == 1 {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
    }
    end
}

fn heading_index(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 0,
        HeadingLevel::H2 => 1,
        HeadingLevel::H3 => 2,
        HeadingLevel::H4 => 3,
        HeadingLevel::H5 => 4,
        HeadingLevel::H6 => 5,
    }
}

impl Renderer<'_> {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.raw.is_some() {
                    self.raw_lines(&text);
                } else {
                    for (idx, part) in text.split('\n').enumerate() {
                        if idx > 0 {
                            self.out.newline();
                        }
                        self.out.write(&escape(part));
                    }
                }
            }
            Event::Code(code) => self.code(&code),
            Event::Html(html) => self.raw_lines(&html),
            Event::InlineHtml(html) => {
                self.ctx.uses_raw_html = true;
                self.out
                    .write(&format!("\\ :{RAW_HTML_ROLE}:`{html}`\\ "));
            }
            Event::SoftBreak | Event::HardBreak => self.out.newline(),
            Event::Rule => {
                self.out.blank_line();
                self.out.writeln("----");
                self.out.blank_line();
            }
            Event::TaskListMarker(done) => {
                self.out.write(if done { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(label) => {
                debug!("footnote reference [^{label}] kept as text");
                self.out.write(&escape(&format!("[^{label}]")));
            }
            other => debug!("unhandled markdown event {other:?}"),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.out.blank_line(),
            Tag::Heading { .. } => {
                self.out.blank_line();
                self.out.start_capture();
            }
            Tag::BlockQuote { .. } => {
                self.out.blank_line();
                self.out.writeln("..");
                self.out.blank_line();
                self.out.push_indent(BLOCK_INDENT, BLOCK_INDENT);
            }
            Tag::CodeBlock(kind) => {
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => info
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.out.blank_line();
                if lang.is_empty() {
                    self.out.writeln(".. code-block::");
                } else {
                    self.out.writeln(&format!(".. code-block:: {lang}"));
                }
                self.open_raw(RawZone::Code);
            }
            Tag::HtmlBlock => {
                self.out.blank_line();
                self.out.writeln(".. raw:: html");
                self.open_raw(RawZone::Html);
            }
            Tag::List(start) => {
                self.out.blank_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.out.end_line();
                let marker = match self.lists.last() {
                    Some(Some(_)) => "#. ",
                    _ => "* ",
                };
                self.out.push_indent(marker, &" ".repeat(marker.len()));
            }
            Tag::Emphasis => self.out.write("\\ *"),
            Tag::Strong => self.out.write("\\ **"),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                self.out.start_capture();
                self.links.push(OpenLink {
                    link_type,
                    dest_url: dest_url.to_string(),
                });
            }
            Tag::Image { dest_url, .. } => {
                self.out.start_capture();
                self.images.push(dest_url.to_string());
            }
            Tag::Table(_) => {
                self.out.blank_line();
                self.out.writeln(".. list-table::");
                self.out.writeln(&format!("{BLOCK_INDENT}:header-rows: 1"));
                self.out.blank_line();
                self.out.push_indent(BLOCK_INDENT, BLOCK_INDENT);
            }
            Tag::TableHead | Tag::TableRow => self.row_cell = 0,
            Tag::TableCell => self.out.start_capture(),
            other => debug!("unhandled markdown tag {other:?}"),
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.blank_line(),
            TagEnd::Heading(level) => {
                let captured = clean_escaped_spaces(&self.out.end_capture());
                let title = trim_inline(&captured);
                let mark = HEADING_MARKS[heading_index(level)];
                self.out.writeln(title);
                self.out
                    .writeln(&mark.to_string().repeat(title.width().max(1)));
                self.out.blank_line();
            }
            TagEnd::BlockQuote { .. } => {
                self.out.pop_indent();
                self.out.blank_line();
            }
            TagEnd::CodeBlock | TagEnd::HtmlBlock => {
                self.out.pop_indent();
                self.raw = None;
                self.out.blank_line();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.out.blank_line();
            }
            TagEnd::Item => {
                self.out.flush_marker();
                self.out.pop_indent();
            }
            TagEnd::Emphasis => self.out.write("*\\ "),
            TagEnd::Strong => self.out.write("**\\ "),
            TagEnd::Link => {
                let text = self.out.end_capture();
                let Some(link) = self.links.pop() else {
                    return;
                };
                match link.link_type {
                    LinkType::Autolink | LinkType::Email => self.out.write(&link.dest_url),
                    _ if trim_inline(&text).is_empty() => {
                        self.out.write(&format!("\\ `<{}>`_\\ ", link.dest_url));
                    }
                    _ => self.out.write(&format!(
                        "\\ `{} <{}>`_\\ ",
                        trim_inline(&text),
                        link.dest_url
                    )),
                }
            }
            TagEnd::Image => {
                let alt = self.out.end_capture();
                let Some(url) = self.images.pop() else {
                    return;
                };
                let name = format!("image-{}", self.ctx.images.len() + 1);
                self.out.write(&format!("\\ |{name}|\\ "));
                self.ctx.images.push(ImageDef {
                    name,
                    url,
                    alt: trim_inline(&alt).to_string(),
                });
            }
            TagEnd::TableCell => {
                let text = self.out.end_capture();
                let bullet = if self.row_cell == 0 { "* -" } else { "  -" };
                let text = clean_escaped_spaces(&text);
                let text = trim_inline(&text);
                if text.is_empty() {
                    self.out.writeln(bullet);
                } else {
                    self.out.writeln(&format!("{bullet} {text}"));
                }
                self.row_cell += 1;
            }
            TagEnd::Table => {
                self.out.pop_indent();
                self.out.blank_line();
            }
            _ => {}
        }
    }

    fn code(&mut self, code: &str) {
        if code.contains("``") {
            self.out
                .write(&format!("\\ :code:`{}`\\ ", code.replace('`', "\\ `")));
        } else {
            self.out.write(&format!("\\ ``{code}``\\ "));
        }
    }

    fn open_raw(&mut self, zone: RawZone) {
        self.out.blank_line();
        self.out.push_indent(BLOCK_INDENT, BLOCK_INDENT);
        self.raw = Some(zone);
    }

    fn raw_lines(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            match piece.strip_suffix('\n') {
                Some(content) => {
                    self.out.write(content);
                    self.out.break_line();
                }
                None => self.out.write(piece),
            }
        }
    }
}
