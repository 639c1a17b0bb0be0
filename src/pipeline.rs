//! The repair run: fix-list extraction → patching → compile check.
//!
//! Fully synchronous. The model's raw answer comes in as a string; the
//! document is loaded once from the source text and every fix in the batch
//! is resolved against that unpatched baseline.

use crate::diagnose::parse::{parse_fix_list, ExtractStrategy, NaiveBracketScan};
use crate::document::SourceDocument;
use crate::error::DoctorResult;
use crate::input::LoadedSource;
use crate::patch::{self, Fix, PatchOutcome};
use crate::verify::{Compiler, Javac, VerificationResult, Verifier};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct RepairOptions {
    /// Also compile each applied fix on its own
    pub isolated: bool,
}

/// Outcome of compiling one fix in isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedCheck {
    /// Position of the fix in the batch
    pub index: usize,
    pub line_number: i64,
    pub result: VerificationResult,
}

#[derive(Debug, Clone)]
pub struct RepairReport {
    pub fixes: Vec<Fix>,
    pub patch: PatchOutcome,
    /// `None` when the model reported no bugs and nothing was compiled
    pub verification: Option<VerificationResult>,
    pub isolated: Vec<IsolatedCheck>,
}

impl RepairReport {
    pub fn no_bugs(&self) -> bool {
        self.fixes.is_empty()
    }
}

pub struct Pipeline<C = Javac> {
    verifier: Verifier<C>,
    strategy: Box<dyn ExtractStrategy>,
    options: RepairOptions,
}

impl<C: Compiler> Pipeline<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            verifier: Verifier::new(compiler),
            strategy: Box::new(NaiveBracketScan),
            options: RepairOptions::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ExtractStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_options(mut self, options: RepairOptions) -> Self {
        self.options = options;
        self
    }

    pub fn verifier(&self) -> &Verifier<C> {
        &self.verifier
    }

    /// Apply the model's fixes to `source` and compile the result.
    ///
    /// The file at `source.path` is overwritten with the patched text. An
    /// empty fix list leaves the file alone.
    pub fn repair(&self, source: &LoadedSource, raw_response: &str) -> DoctorResult<RepairReport> {
        let fixes = parse_fix_list(raw_response, self.strategy.as_ref())?;
        info!(count = fixes.len(), "Decoded fix list");

        if fixes.is_empty() {
            return Ok(RepairReport {
                fixes,
                patch: PatchOutcome::default(),
                verification: None,
                isolated: Vec::new(),
            });
        }

        let original = SourceDocument::from_text(&source.text);
        let mut doc = original.clone();
        let patch = patch::apply(&mut doc, &fixes);

        info!(file = %source.path.display(), "Verifying fixes");
        let verification = self.verifier.verify(&doc, &source.path)?;

        let isolated = if self.options.isolated {
            self.check_each(&original, source, &fixes, &patch)?
        } else {
            Vec::new()
        };

        Ok(RepairReport {
            fixes,
            patch,
            verification: Some(verification),
            isolated,
        })
    }

    /// Compile every fix that was applied, each against the unpatched
    /// document. Skipped fixes are not checked.
    fn check_each(
        &self,
        original: &SourceDocument,
        source: &LoadedSource,
        fixes: &[Fix],
        patch: &PatchOutcome,
    ) -> DoctorResult<Vec<IsolatedCheck>> {
        let mut checks = Vec::new();
        for (index, fix) in fixes.iter().enumerate() {
            if patch.skipped.iter().any(|s| s.index == index) {
                continue;
            }
            let result = self.verifier.verify_isolated(original, &source.path, fix)?;
            checks.push(IsolatedCheck {
                index,
                line_number: fix.line_number,
                result,
            });
        }
        Ok(checks)
    }
}
