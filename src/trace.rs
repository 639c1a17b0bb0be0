//! Stack-trace parsing
//!
//! Turns a raw Java error log into an [`ErrorLocator`]: the exception
//! category from the first line and the file/line of a chosen `at ...` frame.

use crate::error::{DoctorError, DoctorResult};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Category used when the first line does not look like an exception header.
pub const UNKNOWN_EXCEPTION: &str = "Unknown Exception";

/// Namespaces that belong to the JDK rather than the application.
const JDK_PREFIXES: &[&str] = &["java.", "javax.", "jdk.", "sun.", "com.sun."];

fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"at\s+([\w.$]+)\(([^:]+\.java):(\d+)\)").expect("frame pattern is valid")
    })
}

/// The believed root cause of a single stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocator {
    pub exception_category: String,
    pub file_name: String,
    pub line_number: usize,
    /// Qualified method name of the frame, e.g. `com.foo.Bar.run`
    pub frame: String,
}

/// One `at <name>(<File>.java:<n>)` line found in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub qualified_name: String,
    pub file_name: String,
    pub line_number: usize,
}

impl Frame {
    pub fn is_jdk(&self) -> bool {
        JDK_PREFIXES
            .iter()
            .any(|prefix| self.qualified_name.starts_with(prefix))
    }
}

/// Picks the relevant frame among all frames of a trace, top to bottom.
pub trait FrameRanking {
    fn select<'a>(&self, frames: &'a [Frame]) -> Option<&'a Frame>;
}

/// The frame closest to the top of the trace wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFrame;

impl FrameRanking for FirstFrame {
    fn select<'a>(&self, frames: &'a [Frame]) -> Option<&'a Frame> {
        frames.first()
    }
}

/// First frame outside the JDK namespaces, else the first frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFirst;

impl FrameRanking for ApplicationFirst {
    fn select<'a>(&self, frames: &'a [Frame]) -> Option<&'a Frame> {
        frames
            .iter()
            .find(|frame| !frame.is_jdk())
            .or_else(|| frames.first())
    }
}

/// Parse with the default first-frame policy.
pub fn parse(log_text: &str) -> DoctorResult<ErrorLocator> {
    parse_with(log_text, &FirstFrame)
}

pub fn parse_with(log_text: &str, ranking: &dyn FrameRanking) -> DoctorResult<ErrorLocator> {
    let exception_category = exception_category(log_text);
    let frames = frames(log_text);
    debug!(frames = frames.len(), category = %exception_category, "Scanned trace");

    let frame = ranking.select(&frames).ok_or(DoctorError::NoTraceFound)?;
    Ok(ErrorLocator {
        exception_category,
        file_name: frame.file_name.clone(),
        line_number: frame.line_number,
        frame: frame.qualified_name.clone(),
    })
}

/// Text before the first colon of the first line, when that line mentions
/// an exception or error.
fn exception_category(log_text: &str) -> String {
    let first_line = log_text.split(['\n', '\r']).next().unwrap_or("");
    if first_line.contains("Exception") || first_line.contains("Error") {
        first_line
            .split(':')
            .next()
            .unwrap_or(first_line)
            .trim()
            .to_string()
    } else {
        UNKNOWN_EXCEPTION.to_string()
    }
}

/// All frame lines, in log order. Bare `\r` also separates lines.
pub fn frames(log_text: &str) -> Vec<Frame> {
    log_text
        .split(['\n', '\r'])
        .filter_map(|line| {
            let caps = frame_pattern().captures(line.trim())?;
            let line_number = caps[3].parse::<usize>().ok().filter(|n| *n > 0)?;
            Some(Frame {
                qualified_name: caps[1].to_string(),
                file_name: caps[2].to_string(),
                line_number,
            })
        })
        .collect()
}
