//! Compile checks
//!
//! Writes a patched document to disk and runs the Java compiler on it. The
//! whole batch is checked at once; `verify_isolated` checks a single fix on
//! a renamed copy so a failure can be pinned on that fix.

use crate::document::SourceDocument;
use crate::patch::{self, Fix};
use crate::util::{combine_output, remove_if_exists, truncate_output};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

const MAX_OUTPUT_CHARS: usize = 1800;

/// Suffix given to the class (and file) of an isolated check copy.
pub const ISOLATED_SUFFIX: &str = "_Test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    Pass,
    Fail,
    NoCompiler,
}

impl VerifyStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            VerifyStatus::Pass => "✅",
            VerifyStatus::Fail => "❌",
            VerifyStatus::NoCompiler => "❌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerifyStatus::Pass => "PASS",
            VerifyStatus::Fail => "FAIL",
            VerifyStatus::NoCompiler => "No Compiler found.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub status: VerifyStatus,
    /// Combined compiler stdout/stderr (truncated), when there was any
    pub output: Option<String>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.status == VerifyStatus::Pass
    }

    fn no_compiler() -> Self {
        Self {
            status: VerifyStatus::NoCompiler,
            output: None,
        }
    }
}

/// Raw result of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub success: bool,
    pub output: String,
}

/// Something that compiles a single source file in place.
///
/// An `io::ErrorKind::NotFound` error means the compiler itself is missing.
pub trait Compiler {
    fn name(&self) -> &str;
    fn compile(&self, source: &Path) -> io::Result<CompileOutput>;
}

/// The JDK `javac` command.
#[derive(Debug, Clone)]
pub struct Javac {
    program: String,
    args: Vec<String>,
}

impl Javac {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Default for Javac {
    fn default() -> Self {
        Self::new("javac")
    }
}

impl Compiler for Javac {
    fn name(&self) -> &str {
        &self.program
    }

    fn compile(&self, source: &Path) -> io::Result<CompileOutput> {
        let out = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .output()?;
        Ok(CompileOutput {
            success: out.status.success(),
            output: combine_output(&out.stdout, &out.stderr),
        })
    }
}

pub struct Verifier<C = Javac> {
    compiler: C,
}

impl<C: Compiler> Verifier<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Overwrite `target` with `doc` and compile it.
    pub fn verify(&self, doc: &SourceDocument, target: &Path) -> io::Result<VerificationResult> {
        doc.save(target)?;
        self.compile(target)
    }

    /// Apply `fix` alone to a copy of `doc` whose class is renamed to
    /// `<Name>_Test`, compile it next to `original`, then delete the copy
    /// and its class file whatever the outcome.
    pub fn verify_isolated(
        &self,
        doc: &SourceDocument,
        original: &Path,
        fix: &Fix,
    ) -> io::Result<VerificationResult> {
        let class_name = class_name_of(original);
        let test_class = format!("{}{}", class_name, ISOLATED_SUFFIX);

        let mut copy = doc.clone();
        patch::apply(&mut copy, std::slice::from_ref(fix));
        let from = format!("class {}", class_name);
        let to = format!("class {}", test_class);
        copy.map_lines(|line| line.replace(&from, &to));

        let test_file = original.with_file_name(format!("{}.java", test_class));
        debug!(file = %test_file.display(), line = fix.line_number, "Isolated check");

        let result = copy.save(&test_file).and_then(|()| self.compile(&test_file));
        remove_if_exists(&test_file)?;
        remove_if_exists(&test_file.with_extension("class"))?;
        result
    }

    fn compile(&self, source: &Path) -> io::Result<VerificationResult> {
        match self.compiler.compile(source) {
            Ok(out) => {
                let status = if out.success {
                    VerifyStatus::Pass
                } else {
                    VerifyStatus::Fail
                };
                info!(file = %source.display(), ?status, "Compiled");
                let output = Some(truncate_output(&out.output, MAX_OUTPUT_CHARS))
                    .filter(|s| !s.is_empty());
                Ok(VerificationResult { status, output })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(compiler = self.compiler.name(), "Compiler not available");
                Ok(VerificationResult::no_compiler())
            }
            Err(e) => Err(e),
        }
    }
}

/// Class name implied by a `.java` file name (`Demo.java` -> `Demo`).
pub fn class_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compiled artifact written beside a source file.
pub fn class_file_for(source: &Path) -> PathBuf {
    source.with_extension("class")
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;

    /// Records what it was asked to compile. Fails any file whose text
    /// contains `marker`.
    pub(crate) struct FakeCompiler {
        pub(crate) available: bool,
        pub(crate) marker: String,
        pub(crate) seen: RefCell<Vec<(PathBuf, String)>>,
    }

    impl FakeCompiler {
        pub(crate) fn failing_on(marker: &str) -> Self {
            Self {
                available: true,
                marker: marker.to_string(),
                seen: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn missing() -> Self {
            Self {
                available: false,
                ..Self::failing_on("")
            }
        }
    }

    impl Compiler for FakeCompiler {
        fn name(&self) -> &str {
            "fake-javac"
        }

        fn compile(&self, source: &Path) -> io::Result<CompileOutput> {
            if !self.available {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no javac"));
            }
            let text = std::fs::read_to_string(source)?;
            let success = self.marker.is_empty() || !text.contains(&self.marker);
            self.seen.borrow_mut().push((source.to_path_buf(), text));
            // Leave an artifact the way javac would.
            std::fs::write(class_file_for(source), b"\xCA\xFE\xBA\xBE")?;
            Ok(CompileOutput {
                success,
                output: if success {
                    String::new()
                } else {
                    format!("{}: error: cannot find symbol", source.display())
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeCompiler;
    use super::*;

    const DEMO: &str = "public class Demo {\n  int f() {\n    return 1\n  }\n}\n";

    #[test]
    fn test_verify_writes_document_before_compiling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Demo.java");
        std::fs::write(&path, "stale").unwrap();

        let verifier = Verifier::new(FakeCompiler::failing_on("BROKEN"));
        let doc = SourceDocument::from_text(DEMO);
        let result = verifier.verify(&doc, &path).unwrap();

        assert!(result.passed());
        assert_eq!(result.output, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEMO);
        assert_eq!(verifier.compiler().seen.borrow()[0].1, DEMO);
    }

    #[test]
    fn test_verify_reports_failure_with_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Demo.java");
        let verifier = Verifier::new(FakeCompiler::failing_on("return 1"));
        let result = verifier
            .verify(&SourceDocument::from_text(DEMO), &path)
            .unwrap();

        assert_eq!(result.status, VerifyStatus::Fail);
        assert!(result.output.unwrap().contains("cannot find symbol"));
    }

    #[test]
    fn test_missing_compiler_is_its_own_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Demo.java");
        let verifier = Verifier::new(FakeCompiler::missing());
        let result = verifier
            .verify(&SourceDocument::from_text(DEMO), &path)
            .unwrap();
        assert_eq!(result.status, VerifyStatus::NoCompiler);
        assert!(path.exists());
    }

    #[test]
    fn test_javac_missing_binary_maps_to_no_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Demo.java");
        let verifier = Verifier::new(Javac::new("definitely-not-a-real-javac-binary"));
        let result = verifier
            .verify(&SourceDocument::from_text(DEMO), &path)
            .unwrap();
        assert_eq!(result.status, VerifyStatus::NoCompiler);
    }

    #[test]
    fn test_isolated_check_renames_class_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("Demo.java");
        std::fs::write(&original, DEMO).unwrap();

        let verifier = Verifier::new(FakeCompiler::failing_on("BROKEN"));
        let doc = SourceDocument::from_text(DEMO);
        let fix = Fix::new(3, "    return 1;");
        let result = verifier.verify_isolated(&doc, &original, &fix).unwrap();

        assert!(result.passed());
        let seen = verifier.compiler().seen.borrow();
        let (compiled_path, text) = &seen[0];
        assert_eq!(compiled_path, &dir.path().join("Demo_Test.java"));
        assert!(text.starts_with("public class Demo_Test {"));
        assert!(text.contains("    return 1;\n"));

        assert!(!dir.path().join("Demo_Test.java").exists());
        assert!(!dir.path().join("Demo_Test.class").exists());
        // The original file is untouched.
        assert_eq!(std::fs::read_to_string(&original).unwrap(), DEMO);
    }

    #[test]
    fn test_isolated_check_attributes_failure() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("Demo.java");
        let verifier = Verifier::new(FakeCompiler::failing_on("BROKEN"));
        let doc = SourceDocument::from_text(DEMO);

        let good = verifier
            .verify_isolated(&doc, &original, &Fix::new(3, "    return 2;"))
            .unwrap();
        let bad = verifier
            .verify_isolated(&doc, &original, &Fix::new(3, "    BROKEN;"))
            .unwrap();

        assert!(good.passed());
        assert_eq!(bad.status, VerifyStatus::Fail);
        assert!(!dir.path().join("Demo_Test.java").exists());
    }

    #[test]
    fn test_class_name_helpers() {
        assert_eq!(class_name_of(Path::new("/tmp/Demo.java")), "Demo");
        assert_eq!(
            class_file_for(Path::new("/tmp/Demo.java")),
            PathBuf::from("/tmp/Demo.class")
        );
    }
}
