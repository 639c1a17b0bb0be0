//! Console output
//!
//! Everything the user reads goes through here. Rendering functions return
//! strings so they can be tested; the `print_*` wrappers write to stdout.

use crate::diagnose::ModelInfo;
use crate::pipeline::RepairReport;
use crate::trace::ErrorLocator;
use crate::verify::{VerificationResult, VerifyStatus};
use crossterm::style::{style, Color, StyledContent, Stylize};
use std::fmt::{Display, Write as _};

const RULE_WIDTH: usize = 50;

fn paint<D: Display>(value: D, color: Color) -> StyledContent<D> {
    style(value).with(color)
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn banner() -> String {
    format!("\n{}", style("🩺 AI Code Doctor").bold())
}

pub fn paste_instructions() -> String {
    format!(
        "{}\n{}\n{}",
        paint("👇 Please paste your Java code below.", Color::Green),
        paint("   (Type 'END' on a new line when finished)", Color::Cyan),
        "-".repeat(40)
    )
}

pub fn reading_file(name: &str) -> String {
    format!("{}{}", paint("📂 Reading File:   ", Color::Cyan), name)
}

pub fn saved_snippet(name: &str) -> String {
    format!("{}{}", paint("💾 Code saved: ", Color::Cyan), name)
}

pub fn scanning() -> String {
    paint("🧠 Scanning code... ", Color::Yellow).to_string()
}

pub fn done() -> String {
    paint("Done!", Color::Green).to_string()
}

pub fn trace_located(locator: &ErrorLocator, window: &str) -> String {
    format!(
        "{}{} at {}:{}\n{}",
        paint("🔎 Trace: ", Color::Cyan),
        locator.exception_category,
        locator.file_name,
        locator.line_number,
        window.trim_end()
    )
}

pub fn error(message: &str) -> String {
    format!("{}", paint(format!("❌ {}", message), Color::Red))
}

pub fn unexpected(message: &str) -> String {
    format!("{}", paint(format!("\n💥 Error: {}", message), Color::Red))
}

/// Shown when no fix list could be located; includes the raw answer.
pub fn no_fix_list(raw: &str) -> String {
    format!(
        "{}\nRaw output: {}",
        error("Could not find valid JSON in AI response."),
        raw
    )
}

/// Issue list, per-fix lines, and skipped-fix warning.
pub fn summary(report: &RepairReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule());

    if report.no_bugs() {
        let _ = writeln!(
            out,
            "{}",
            paint("✅ NO BUGS FOUND! Your code looks clean.", Color::Green)
        );
        let _ = write!(out, "{}", rule());
        return out;
    }

    let count = report.fixes.len();
    let noun = if count == 1 { "ISSUE" } else { "ISSUES" };
    let _ = writeln!(out, "{}", style(format!("💡 FOUND {} {}", count, noun)).bold());
    let _ = writeln!(out, "{}", rule());

    for fix in report.fixes.iter().filter(|f| f.line_number != -1) {
        let _ = writeln!(
            out,
            "{}{}",
            paint(format!("📍 Line {}: ", fix.line_number), Color::Cyan),
            fix.explanation
        );
        let _ = writeln!(
            out,
            "{}",
            paint(format!("   Fix: {}", fix.fixed_code), Color::Green)
        );
    }

    let skipped = report.patch.skipped_count();
    if skipped > 0 {
        let _ = writeln!(
            out,
            "{}",
            paint(
                format!("⚠️  {} fix(es) did not match a line and were skipped", skipped),
                Color::Yellow
            )
        );
    }
    let _ = write!(out, "{}", rule());
    out
}

pub fn verification(result: &VerificationResult) -> String {
    let color = match result.status {
        VerifyStatus::Pass => Color::Green,
        VerifyStatus::Fail | VerifyStatus::NoCompiler => Color::Red,
    };
    let mut out = format!(
        "{}{}",
        paint("🧪 Verifying fixes... ", Color::Yellow),
        paint(
            format!("{} {}", result.status.icon(), result.status.label()),
            color
        )
    );
    if result.status == VerifyStatus::Fail {
        if let Some(output) = &result.output {
            let _ = write!(out, "\n{}", output);
        }
    }
    out
}

/// One line per fix compiled on its own.
pub fn isolated(report: &RepairReport) -> String {
    report
        .isolated
        .iter()
        .map(|check| {
            let color = if check.result.passed() {
                Color::Green
            } else {
                Color::Red
            };
            format!(
                "   Line {}: {}",
                check.line_number,
                paint(
                    format!("{} {}", check.result.status.icon(), check.result.status.label()),
                    color
                )
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn models(models: &[ModelInfo]) -> String {
    let mut out = format!("{}\n", paint("🔍 API Key Access Check:", Color::Cyan));
    for model in models {
        let marker = if model.can_generate() { "•" } else { " " };
        let _ = writeln!(
            out,
            " {} {}{}",
            marker,
            model.short_name(),
            model
                .display_name
                .as_deref()
                .map(|d| format!(" ({})", d))
                .unwrap_or_default()
        );
    }
    out
}

/// Print the outcome of a repair run.
pub fn print_report(report: &RepairReport) {
    println!("{}", summary(report));
    if let Some(result) = &report.verification {
        println!("\n{}", verification(result));
    }
    if !report.isolated.is_empty() {
        println!("{}", paint("🔬 Individual fixes:", Color::Cyan));
        println!("{}", isolated(report));
    }
}
