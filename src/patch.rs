//! Line-level patch application
//!
//! A batch of [`Fix`]es replaces whole lines of a [`SourceDocument`]. All
//! line numbers in a batch refer to the unpatched document; the document
//! never grows or shrinks. When two fixes target the same line, the later
//! one in the batch wins.

use crate::document::SourceDocument;
use tracing::{debug, warn};

/// A proposed replacement for exactly one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// 1-based line in the original document; `-1` means "no line"
    pub line_number: i64,
    pub explanation: String,
    pub fixed_code: String,
}

impl Fix {
    pub fn new(line_number: i64, fixed_code: impl Into<String>) -> Self {
        Self {
            line_number,
            explanation: String::new(),
            fixed_code: fixed_code.into(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// Why a fix in a batch was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The model gave no line number
    Sentinel,
    /// The line number is not inside the document
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFix {
    /// Position of the fix in its batch (0-based)
    pub index: usize,
    pub line_number: i64,
    pub reason: SkipReason,
}

/// What happened to each fix of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Line numbers written, in batch order (duplicates kept)
    pub applied: Vec<usize>,
    pub skipped: Vec<SkippedFix>,
}

impl PatchOutcome {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Re-open a block the model closed off by dropping a trailing `{`.
///
/// When the current line (trimmed) ends with `{` and the replacement
/// (trimmed) does not, `" {"` is appended to the replacement.
pub fn continue_brace(original: &str, replacement: &str) -> String {
    if original.trim().ends_with('{') && !replacement.trim().ends_with('{') {
        format!("{} {{", replacement)
    } else {
        replacement.to_string()
    }
}

/// Map a fix's line number onto the document, if it names a real line.
fn target_line(doc: &SourceDocument, line_number: i64) -> Result<usize, SkipReason> {
    if line_number == -1 {
        return Err(SkipReason::Sentinel);
    }
    usize::try_from(line_number)
        .ok()
        .filter(|n| (1..=doc.len()).contains(n))
        .ok_or(SkipReason::OutOfRange)
}

/// Apply a batch in order. Skipped fixes are reported, never fatal.
///
/// The brace heuristic looks at the line as it stands when the fix is
/// applied, so an earlier fix to the same line is what a later one sees.
pub fn apply(doc: &mut SourceDocument, batch: &[Fix]) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();

    for (index, fix) in batch.iter().enumerate() {
        let line = match target_line(doc, fix.line_number) {
            Ok(line) => line,
            Err(reason) => {
                debug!(index, line = fix.line_number, ?reason, "Skipping fix");
                outcome.skipped.push(SkippedFix {
                    index,
                    line_number: fix.line_number,
                    reason,
                });
                continue;
            }
        };

        let current = doc.line(line).unwrap_or_default();
        let replacement = continue_brace(current, &fix.fixed_code);
        debug!(line, braced = replacement != fix.fixed_code, "Applying fix");
        doc.replace_line(line, replacement);
        outcome.applied.push(line);
    }

    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            total = batch.len(),
            "Some fixes did not name a line in the file"
        );
    }
    outcome
}
