//! ai-doctor library crate
//!
//! Exposes the repair pipeline so the binary, benchmarks and tests can
//! drive extraction, patching and verification directly.

pub mod config;
pub mod context;
pub mod diagnose;
pub mod document;
pub mod error;
pub mod input;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod trace;
pub mod util;
pub mod verify;

pub use document::SourceDocument;
pub use error::{DoctorError, DoctorResult};
pub use patch::{Fix, PatchOutcome};
pub use pipeline::{Pipeline, RepairOptions, RepairReport};
pub use trace::ErrorLocator;
pub use verify::{VerificationResult, VerifyStatus};
