/// Source text builder with indentation tracking.
pub struct CodeWriter {
    output: String,
    indent_level: usize,
    indent_width: usize,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_width: 4,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    /// Writes one indented line. Empty lines carry no indentation.
    pub fn line(&mut self, s: &str) {
        if !s.is_empty() {
            for _ in 0..(self.indent_level * self.indent_width) {
                self.output.push(' ');
            }
            self.output.push_str(s);
        }
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Writes `head {`, runs `body` one level deeper, then writes `}`.
    pub fn block(&mut self, head: &str, body: impl FnOnce(&mut Self)) {
        self.line(&format!("{head} {{"));
        self.inc_indent();
        body(self);
        self.dec_indent();
        self.line("}");
    }

    /// Appends pre-rendered text, re-indenting each of its lines.
    pub fn embed(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub fn inc_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dec_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}
