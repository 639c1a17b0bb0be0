//! In-memory, line-indexed view of a source file under repair.
//!
//! Lines are addressed 1-based from the outside and stored 0-based.
//! The number of lines is fixed once loaded; patching only replaces content.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDocument {
    lines: Vec<String>,
}

impl SourceDocument {
    /// Split text on line terminators. A trailing terminator does not
    /// produce an extra empty line.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line content at a 1-based line number.
    pub fn line(&self, line_number: usize) -> Option<&str> {
        line_number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Replace the content of an existing 1-based line. Returns `false`
    /// (and leaves the document untouched) when the line does not exist.
    pub fn replace_line(&mut self, line_number: usize, content: String) -> bool {
        match line_number
            .checked_sub(1)
            .and_then(|idx| self.lines.get_mut(idx))
        {
            Some(slot) => {
                *slot = content;
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Apply `f` to every line in place.
    pub fn map_lines(&mut self, mut f: impl FnMut(&str) -> String) {
        for line in &mut self.lines {
            *line = f(line);
        }
    }

    /// Render with every line terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Write the document to `path`, replacing whatever is there.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_text())
    }
}
