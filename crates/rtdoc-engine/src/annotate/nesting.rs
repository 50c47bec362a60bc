/// Section nesting state of the annotator.
///
/// Indentation depth and header depth move in lockstep: every pushed level
/// adds one two-space indentation unit and one header level, so
/// `header_level - initial_level == indent_units` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nesting {
    initial_level: usize,
    indent_units: usize,
    header_level: usize,
}

impl Nesting {
    /// One level of section indentation.
    pub const UNIT: &'static str = "  ";

    pub fn new(initial_level: usize) -> Self {
        Self {
            initial_level,
            indent_units: 0,
            header_level: initial_level,
        }
    }

    /// Number of two-space units stripped from each line.
    pub fn indent_units(&self) -> usize {
        self.indent_units
    }

    /// Header level a section header at the current depth is rendered at.
    pub fn header_level(&self) -> usize {
        self.header_level
    }

    /// Pops levels until `line` carries the current indentation, then strips it.
    ///
    /// Only one level is popped per step, so a line dedenting by several
    /// levels walks the stack back up one level at a time. A line indented
    /// less than any open level ends at depth zero.
    pub fn dedent<'a>(&mut self, line: &'a str) -> &'a str {
        while self.indent_units > 0 && !Self::has_units(line, self.indent_units) {
            self.pop();
        }
        &line[self.indent_units * Self::UNIT.len()..]
    }

    /// Opens one nesting level below the current one.
    pub fn push(&mut self) {
        self.indent_units += 1;
        self.header_level += 1;
        self.check();
    }

    fn pop(&mut self) {
        self.indent_units -= 1;
        self.header_level -= 1;
        self.check();
    }

    fn has_units(line: &str, units: usize) -> bool {
        let width = units * Self::UNIT.len();
        line.len() >= width && line.as_bytes()[..width].iter().all(|b| *b == b' ')
    }

    fn check(&self) {
        debug_assert_eq!(
            self.header_level - self.initial_level,
            self.indent_units,
            "header level and indentation out of step"
        );
    }
}
