//! Source context lookup
//!
//! Finds a file by base name somewhere under a root directory and renders a
//! small numbered window of lines around a target line, so a stack-trace
//! location can be shown to the user or fed into the diagnosis prompt.

mod window;

pub use window::{extract_window, ContextWindow, CONTEXT_LINES};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Chooses one file among all files under the root sharing the wanted name.
/// Candidates arrive in traversal order.
pub trait FileRanking {
    fn select<'a>(&self, candidates: &'a [PathBuf]) -> Option<&'a PathBuf>;
}

/// First file encountered during the walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl FileRanking for FirstMatch {
    fn select<'a>(&self, candidates: &'a [PathBuf]) -> Option<&'a PathBuf> {
        candidates.first()
    }
}

/// File closest to the root; ties keep traversal order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shallowest;

impl FileRanking for Shallowest {
    fn select<'a>(&self, candidates: &'a [PathBuf]) -> Option<&'a PathBuf> {
        candidates
            .iter()
            .min_by_key(|path| path.components().count())
    }
}

/// Looks up source files under a root directory.
pub struct ContextLocator<R = FirstMatch> {
    root: PathBuf,
    ranking: R,
}

impl ContextLocator<FirstMatch> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ranking: FirstMatch,
        }
    }
}

impl<R: FileRanking> ContextLocator<R> {
    pub fn with_ranking(root: impl Into<PathBuf>, ranking: R) -> Self {
        Self {
            root: root.into(),
            ranking,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every file under the root whose base name equals `file_name`.
    ///
    /// Entries are visited sorted by name so repeated runs see the same
    /// order. Unreadable entries are skipped.
    pub fn candidates(&self, file_name: &str) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.file_name().to_str() == Some(file_name))
            .map(|e| e.into_path())
            .collect()
    }

    pub fn find_file(&self, file_name: &str) -> Option<PathBuf> {
        let candidates = self.candidates(file_name);
        if candidates.len() > 1 {
            debug!(
                file = file_name,
                count = candidates.len(),
                "Multiple files share this name"
            );
        }
        self.ranking.select(&candidates).cloned()
    }

    /// Rendered window around `line_number` in the file named `file_name`,
    /// or `"File not found: <name>"` when no such file exists.
    pub fn locate(&self, file_name: &str, line_number: usize) -> std::io::Result<String> {
        let Some(path) = self.find_file(file_name) else {
            return Ok(not_found_message(file_name));
        };
        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        Ok(extract_window(&lines, line_number).render())
    }
}

/// Display text returned in place of a window when the file is missing.
pub fn not_found_message(file_name: &str) -> String {
    format!("File not found: {}", file_name)
}
