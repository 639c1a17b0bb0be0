use crate::error::{DoctorError, DoctorResult};
use crate::patch::Fix;
use serde_json::{Map, Value};
use tracing::debug;

/// Explanation used when an entry has none.
pub const MISSING_EXPLANATION: &str = "No details.";

/// Line number used when an entry has none; such fixes are never applied.
pub const SENTINEL_LINE: i64 = -1;

/// Locates the fix-list JSON array inside a raw model response.
pub trait ExtractStrategy {
    fn name(&self) -> &'static str;
    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str>;
}

/// Span from the first `[` to the last `]`.
///
/// Assumes the response holds exactly one array and no other brackets in
/// the surrounding prose. A bracket in the prose before or after the array
/// widens the span and the decode will fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveBracketScan;

impl ExtractStrategy for NaiveBracketScan {
    fn name(&self) -> &'static str {
        "naive-bracket-scan"
    }

    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let start = raw.find('[')?;
        let end = raw.rfind(']')?;
        if end > start {
            Some(&raw[start..=end])
        } else {
            None
        }
    }
}

/// First bracket-balanced span that opens an array of objects (or an empty
/// array). Brackets inside JSON string literals are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedScan;

impl BalancedScan {
    /// Byte index of the `]` closing the `[` at `start`.
    fn closing_index(text: &str, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, c) in text[start..].char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(start + offset);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn opens_object_array(span: &str) -> bool {
        matches!(span[1..].trim_start().chars().next(), Some('{') | Some(']'))
    }
}

impl ExtractStrategy for BalancedScan {
    fn name(&self) -> &'static str {
        "balanced-scan"
    }

    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str> {
        raw.match_indices('[').find_map(|(start, _)| {
            let end = Self::closing_index(raw, start)?;
            let span = &raw[start..=end];
            Self::opens_object_array(span).then_some(span)
        })
    }
}

/// Extract and decode the fix list from a raw model response.
pub fn parse_fix_list(raw: &str, strategy: &dyn ExtractStrategy) -> DoctorResult<Vec<Fix>> {
    let json = strategy.extract(raw).ok_or_else(|| DoctorError::NoFixList {
        raw: raw.to_string(),
    })?;
    debug!(strategy = strategy.name(), chars = json.len(), "Extracted fix list");
    decode_fix_batch(json)
}

/// Decode a JSON array of `{explanation, lineNumber, fixedCode}` objects.
///
/// Missing (or null) fields fall back to defaults instead of failing the
/// batch. Anything that is not an array of objects is malformed.
pub fn decode_fix_batch(json: &str) -> DoctorResult<Vec<Fix>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| DoctorError::MalformedFixList(e.to_string()))?;

    let Value::Array(entries) = value else {
        return Err(DoctorError::MalformedFixList(
            "expected a JSON array".to_string(),
        ));
    };

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            entry.as_object().map(decode_fix).ok_or_else(|| {
                DoctorError::MalformedFixList(format!("entry {} is not an object", idx + 1))
            })
        })
        .collect()
}

fn decode_fix(entry: &Map<String, Value>) -> Fix {
    let field = |key: &str| entry.get(key).filter(|v| !v.is_null());

    Fix {
        line_number: field("lineNumber").map_or(SENTINEL_LINE, line_number_of),
        explanation: field("explanation")
            .map(text_of)
            .unwrap_or_else(|| MISSING_EXPLANATION.to_string()),
        fixed_code: field("fixedCode").map(text_of).unwrap_or_default(),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn line_number_of(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(SENTINEL_LINE),
        Value::String(s) => s.trim().parse().unwrap_or(SENTINEL_LINE),
        _ => SENTINEL_LINE,
    }
}
