//! Indent-aware string builder for generated pipeline source.
//!
//! Python and SQL output use 4-space indentation, Scala uses 2.

/// Indent-aware string builder that produces formatted source code.
pub struct CodeWriter {
    buf: String,
    indent_level: usize,
    indent_width: usize,
    /// True if the current line has not yet been written to.
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::with_indent(4)
    }

    pub fn with_indent(indent_width: usize) -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_level: 0,
            indent_width,
            at_line_start: true,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        self.write_indent();
        self.buf.push_str(text);
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Write several lines at the current indent.
    pub fn lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for text in lines {
            self.line(text);
        }
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    /// Increase indent by one level.
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indent by one level.
    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and increase indent (e.g. `object ETLPipeline {`).
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent();
    }

    /// Decrease indent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Write `text:` and increase indent (Python suites).
    pub fn suite_open(&mut self, text: &str) {
        self.line(&format!("{}:", text));
        self.indent();
    }

    /// Close a Python suite.
    pub fn suite_close(&mut self) {
        self.dedent();
    }

    /// Consume the writer and return the generated string.
    pub fn finish(self) -> String {
        self.buf
    }

    fn write_indent(&mut self) {
        if self.at_line_start && self.indent_level > 0 {
            for _ in 0..self.indent_level * self.indent_width {
                self.buf.push(' ');
            }
        }
        self.at_line_start = false;
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
