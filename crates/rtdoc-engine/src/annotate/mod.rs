//! # Annotation
//!
//! Single pass over runtime documentation text that recovers section
//! structure and callouts and emits Markdown with embedded RST directives.
//!
//! ## Source grammar
//!
//! - Blocks are separated by blank lines
//! - Each section level is indented by two more spaces
//! - `* Title *` on the first line of a block is a section header
//! - `NOTE: ` or `WARNING: ` on the first line of a block opens a callout
//!
//! ## Modules
//!
//! - **`lines`**: line splitting and blank detection
//! - **`nesting`**: `Nesting` counter pair and the dedent algorithm
//! - **`classify`**: `classify` for the first line of a block
//! - **`admonition`**: callout prefixes, directives and body indentation
//!
//! ## Key Invariants
//!
//! - All state lives in one `Annotator` and dies with it
//! - Header depth and indentation depth change together
//! - Each block is preceded by exactly one empty output line

pub mod admonition;
pub mod classify;
pub mod lines;
pub mod nesting;

pub use admonition::AdmonitionKind;
pub use classify::{BlockClass, HeaderMarker, classify};
pub use lines::{LineRef, lines_with_numbers};
pub use nesting::Nesting;

use log::{trace, warn};

/// Deepest header level the Markdown heading syntax can express.
pub const MAX_HEADER_LEVEL: usize = 6;

/// Line-by-line state machine producing the annotated text.
pub struct Annotator {
    nesting: Nesting,
    in_admonition: bool,
    at_block_start: bool,
    out: Vec<String>,
}

impl Annotator {
    pub fn new(header_level: usize) -> Self {
        Self {
            nesting: Nesting::new(header_level),
            in_admonition: false,
            at_block_start: true,
            out: vec![],
        }
    }

    pub fn push(&mut self, lr: &LineRef<'_>) {
        if lr.is_blank {
            self.in_admonition = false;
            self.at_block_start = true;
            return;
        }

        let line = self.nesting.dedent(lr.text);

        if !self.at_block_start {
            self.push_body_line(line);
            return;
        }

        self.at_block_start = false;
        self.out.push(String::new());

        match classify(line) {
            BlockClass::SectionHeader { title } => {
                trace!(
                    "line {}: header '{title}' at level {}",
                    lr.number,
                    self.nesting.header_level()
                );
                self.out.push(self.heading(title));
                self.nesting.push();
                // The header is a block on its own: the next line opens a new one.
                self.at_block_start = true;
            }
            BlockClass::Admonition { kind, text } => {
                trace!("line {}: {kind:?} block", lr.number);
                self.out.push(kind.directive().to_string());
                self.out.push(AdmonitionKind::opening_line(text));
                self.in_admonition = true;
            }
            BlockClass::Body => self.push_body_line(line),
        }
    }

    pub fn finish(self) -> String {
        let mut text = self.out.join("\n");
        text.push('\n');
        text
    }

    fn push_body_line(&mut self, line: &str) {
        if self.in_admonition {
            self.out.push(AdmonitionKind::continuation_line(line));
        } else {
            self.out.push(line.to_string());
        }
    }

    fn heading(&self, title: &str) -> String {
        let mut level = self.nesting.header_level();
        if level > MAX_HEADER_LEVEL {
            warn!("section '{title}' at level {level} rendered at level {MAX_HEADER_LEVEL}");
            level = MAX_HEADER_LEVEL;
        }
        format!("{} {title}", "#".repeat(level))
    }
}

/// Converts runtime documentation text into annotated Markdown.
///
/// `header_level` is the level the outermost section headers are rendered at.
pub fn annotate(text: &str, header_level: usize) -> String {
    let mut annotator = Annotator::new(header_level);
    for lr in lines_with_numbers(text) {
        annotator.push(&lr);
    }
    annotator.finish()
}
