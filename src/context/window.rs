use std::fmt::Write as _;

/// Lines shown on each side of the target line.
pub const CONTEXT_LINES: usize = 5;

const TARGET_MARKER: &str = " -> ";
const PLAIN_MARKER: &str = "    ";

/// A clamped slice of a file around a target line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    /// 1-based number of the first line in `lines`
    pub first_line: usize,
    /// 1-based target line (may fall outside the window for bad input)
    pub target_line: usize,
    pub lines: Vec<String>,
}

impl ContextWindow {
    pub fn last_line(&self) -> usize {
        self.first_line + self.lines.len().saturating_sub(1)
    }

    /// `<n><marker><content>` per line, each terminated by `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (offset, content) in self.lines.iter().enumerate() {
            let number = self.first_line + offset;
            let marker = if number == self.target_line {
                TARGET_MARKER
            } else {
                PLAIN_MARKER
            };
            let _ = writeln!(out, "{}{}{}", number, marker, content);
        }
        out
    }
}

/// Window of [`CONTEXT_LINES`] before and after the 1-based `target_line`,
/// clamped to the document.
pub fn extract_window<S: AsRef<str>>(lines: &[S], target_line: usize) -> ContextWindow {
    let target_idx = target_line.saturating_sub(1);
    let start = target_idx.saturating_sub(CONTEXT_LINES);
    let end = lines.len().min(target_idx.saturating_add(CONTEXT_LINES + 1));
    let slice: &[S] = if start < end { &lines[start..end] } else { &[] };

    ContextWindow {
        first_line: start + 1,
        target_line,
        lines: slice.iter().map(|l| l.as_ref().to_string()).collect(),
    }
}
