//! Source input: a file on disk or code pasted into the terminal.
//!
//! Pasted code is written to `<ClassName>.java` inside a fresh scratch
//! directory so the compiler accepts it without touching files the user
//! already has. The directory is removed when the source is dropped.

use crate::error::{DoctorError, DoctorResult};
use crate::util::remove_if_exists;
use crate::verify::class_file_for;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;
use tracing::debug;

/// Line that ends pasted input.
pub const END_MARKER: &str = "END";

/// Class name used when pasted code declares none.
pub const DEFAULT_CLASS_NAME: &str = "TempDebug";

fn class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"class\s+(\w+)").expect("class pattern is valid"))
}

/// Source text plus where it lives on disk.
#[derive(Debug)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub text: String,
    /// Written by us from pasted input; deleted by [`LoadedSource::cleanup`]
    pub ephemeral: bool,
    _scratch: Option<TempDir>,
}

impl LoadedSource {
    /// Read a user-supplied file. The file is left in place at the end.
    pub fn from_file(path: &Path) -> DoctorResult<Self> {
        if !path.exists() {
            return Err(DoctorError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            ephemeral: false,
            _scratch: None,
        })
    }

    /// Persist pasted code as `<ClassName>.java` in a new scratch
    /// directory under `parent`.
    pub fn from_snippet(code: &str, parent: &Path) -> DoctorResult<Self> {
        if code.trim().is_empty() {
            return Err(DoctorError::EmptyInput);
        }
        let scratch = tempfile::Builder::new()
            .prefix("ai-doctor-")
            .tempdir_in(parent)?;
        let path = scratch.path().join(format!("{}.java", class_name_for(code)));
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(code.as_bytes())?;
        debug!(path = %path.display(), "Saved pasted code");
        Ok(Self {
            path,
            text: code.to_string(),
            ephemeral: true,
            _scratch: Some(scratch),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Delete the temp source and its class file. No-op for user files.
    pub fn cleanup(&self) -> io::Result<()> {
        if !self.ephemeral {
            return Ok(());
        }
        remove_if_exists(&self.path)?;
        remove_if_exists(&class_file_for(&self.path))
    }
}

/// Name of the first `class <Name>` declaration, or [`DEFAULT_CLASS_NAME`].
pub fn class_name_for(code: &str) -> String {
    class_pattern()
        .captures(code)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string())
}

/// Read pasted lines until a line reading `END` (surrounding whitespace
/// ignored) or end of input. Every kept line ends with `\n`.
pub fn read_pasted<R: BufRead>(reader: R) -> io::Result<String> {
    let mut buffer = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim() == END_MARKER {
            break;
        }
        buffer.push_str(&line);
        buffer.push('\n');
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_pasted_stops_at_end_marker() {
        let input = "class A {\n}\n  END  \nignored\n";
        let code = read_pasted(Cursor::new(input)).unwrap();
        assert_eq!(code, "class A {\n}\n");
    }

    #[test]
    fn test_read_pasted_without_marker_reads_everything() {
        let code = read_pasted(Cursor::new("a\r\nb")).unwrap();
        assert_eq!(code, "a\nb\n");
    }

    #[test]
    fn test_class_name_heuristic() {
        assert_eq!(class_name_for("public class Shop {\n}"), "Shop");
        assert_eq!(class_name_for("// helper\nfinal class   Cart extends Base"), "Cart");
        assert_eq!(class_name_for("interface Only {}"), DEFAULT_CLASS_NAME);
    }

    #[test]
    fn test_snippet_is_saved_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let source = LoadedSource::from_snippet("class Shop {}\n", dir.path()).unwrap();
        assert!(source.path.starts_with(dir.path()));
        assert_ne!(source.path.parent(), Some(dir.path()));
        assert_eq!(source.file_name(), "Shop.java");
        assert_eq!(std::fs::read_to_string(&source.path).unwrap(), "class Shop {}\n");
        assert!(source.ephemeral);
        let class_file = source.path.with_extension("class");
        std::fs::write(&class_file, b"x").unwrap();

        source.cleanup().unwrap();
        assert!(!source.path.exists());
        assert!(!class_file.exists());

        let scratch = source.path.parent().unwrap().to_path_buf();
        drop(source);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_snippet_leaves_same_named_user_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let user_file = dir.path().join("Shop.java");
        std::fs::write(&user_file, "class Shop { int real; }\n").unwrap();
        std::fs::write(dir.path().join("Shop.class"), b"user bytes").unwrap();

        let source = LoadedSource::from_snippet("class Shop {}\n", dir.path()).unwrap();
        assert_ne!(source.path, user_file);
        source.cleanup().unwrap();
        drop(source);

        assert_eq!(
            std::fs::read_to_string(&user_file).unwrap(),
            "class Shop { int real; }\n"
        );
        assert!(dir.path().join("Shop.class").exists());
    }

    #[test]
    fn test_blank_snippet_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LoadedSource::from_snippet(" \n\t\n", dir.path()),
            Err(DoctorError::EmptyInput)
        ));
    }

    #[test]
    fn test_user_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Keep.java");
        std::fs::write(&path, "class Keep {}\n").unwrap();

        let source = LoadedSource::from_file(&path).unwrap();
        assert!(!source.ephemeral);
        source.cleanup().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_is_an_input_error() {
        let err = LoadedSource::from_file(Path::new("/no/such/Dir/X.java")).unwrap_err();
        assert!(matches!(err, DoctorError::FileNotFound(_)));
        assert_eq!(err.to_string(), "File not found: /no/such/Dir/X.java");
    }
}
