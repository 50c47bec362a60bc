use std::mem;

/// Line prefix owned by an open container (list item, quote, code block).
#[derive(Debug, Clone)]
struct Indent {
    /// Prefix for the first line written inside the container.
    first: String,
    /// Prefix for every later line.
    rest: String,
    used: bool,
}

/// Line-oriented RST output buffer.
///
/// Text is accumulated into the current line; container prefixes are applied
/// when a line is opened. While a capture is active, writes go into the
/// capture buffer instead (used for headings, links and table cells, whose
/// text has to be known before it can be placed).
#[derive(Debug, Default)]
pub(crate) struct RstOutput {
    /// Finished lines.
    lines: Vec<String>,
    /// Current line being accumulated.
    cur_line: String,
    line_open: bool,
    indents: Vec<Indent>,
    captures: Vec<String>,
}

impl RstOutput {
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(capture) = self.captures.last_mut() {
            capture.push_str(text);
            return;
        }
        if !self.line_open {
            self.open_line();
        }
        self.cur_line.push_str(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.end_line();
    }

    /// Line break inside running text. Captured text is folded onto one line.
    pub fn newline(&mut self) {
        if let Some(capture) = self.captures.last_mut() {
            capture.push(' ');
        } else {
            self.end_line();
        }
    }

    /// Line break inside verbatim text: ends the open line or emits an empty one.
    pub fn break_line(&mut self) {
        if self.line_open {
            self.end_line();
        } else {
            self.lines.push(String::new());
        }
    }

    pub fn end_line(&mut self) {
        if self.line_open {
            self.lines.push(mem::take(&mut self.cur_line));
            self.line_open = false;
        }
    }

    /// Ends the open line and makes sure the last line is blank.
    pub fn blank_line(&mut self) {
        self.end_line();
        if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn push_indent(&mut self, first: &str, rest: &str) {
        self.indents.push(Indent {
            first: first.to_string(),
            rest: rest.to_string(),
            used: false,
        });
    }

    pub fn pop_indent(&mut self) {
        self.end_line();
        self.indents.pop();
    }

    /// Emits the innermost container's first-line prefix if nothing used it yet.
    pub fn flush_marker(&mut self) {
        if self.indents.last().is_some_and(|indent| !indent.used) {
            self.end_line();
            self.open_line();
            let trimmed = self.cur_line.trim_end().len();
            self.cur_line.truncate(trimmed);
            self.end_line();
        }
    }

    pub fn start_capture(&mut self) {
        self.captures.push(String::new());
    }

    pub fn end_capture(&mut self) -> String {
        self.captures.pop().unwrap_or_default()
    }

    /// Finished text without leading or trailing blank lines.
    pub fn finish(mut self) -> String {
        self.end_line();
        let start = self
            .lines
            .iter()
            .position(|line| !line.trim().is_empty())
            .unwrap_or(self.lines.len());
        let end = self
            .lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(start, |idx| idx + 1);
        self.lines[start..end.max(start)].join("\n")
    }

    fn open_line(&mut self) {
        let mut prefix = String::new();
        for indent in &mut self.indents {
            if indent.used {
                prefix.push_str(&indent.rest);
            } else {
                prefix.push_str(&indent.first);
                indent.used = true;
            }
        }
        self.cur_line = prefix;
        self.line_open = true;
    }
}
