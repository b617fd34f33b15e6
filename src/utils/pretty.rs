//! Text layout helpers for printing solver results.
//!
//! Quasts are printed as nested, indented s-expressions in the layout used
//! by PIP. [`IndentWriter`] takes care of the indentation; the quast module
//! only decides what goes on each line.

use std::fmt;

/// An indenting line writer.
#[derive(Debug)]
pub struct IndentWriter {
    output: String,
    indent_level: usize,
    indent_str: String,
    at_line_start: bool,
}

impl IndentWriter {
    /// Create a new writer with the given indent string.
    pub fn new(indent_str: &str) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: indent_str.to_string(),
            at_line_start: true,
        }
    }

    /// Create a writer indenting by one space per level, as PIP does.
    pub fn single_space() -> Self {
        Self::new(" ")
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Write text.
    pub fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.output.push('\n');
                self.at_line_start = true;
            } else {
                if self.at_line_start {
                    for _ in 0..self.indent_level {
                        self.output.push_str(&self.indent_str);
                    }
                    self.at_line_start = false;
                }
                self.output.push(c);
            }
        }
    }

    /// Write a line.
    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.write("\n");
    }

    /// Write `open`, run `f` one level deeper, then close the parenthesis.
    pub fn parenthesized<F: FnOnce(&mut Self)>(&mut self, open: &str, f: F) {
        self.writeln(&format!("({}", open));
        self.indent();
        f(self);
        self.dedent();
        self.writeln(")");
    }

    /// Get the formatted output.
    pub fn finish(self) -> String {
        self.output
    }
}

impl fmt::Write for IndentWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}

/// Format a list with separators.
pub fn format_list<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Format an integer vector as a PIP vector literal: `#[1 0 -2]`.
pub fn format_vector<T: fmt::Display>(items: &[T]) -> String {
    format!("#[{}]", format_list(items, " "))
}
