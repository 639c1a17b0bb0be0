use crate::trace::ErrorLocator;

/// Task used when the user gave no bug description.
pub const SCAN_ALL_TASK: &str =
    "Scan this code for ALL syntax errors, logical bugs, and runtime crashes.";

pub const DIAGNOSIS_TEMPLATE: &str = r#"You are a Senior Java Engineer.
Task: {task}
{trace}
Source Code:
{code}

Return a JSON ARRAY of errors. Format:
[
  {
    "explanation": "Brief explanation of bug #1",
    "lineNumber": 10,
    "fixedCode": "Corrected code for line 10"
  },
  {
    "explanation": "Brief explanation of bug #2",
    "lineNumber": 15,
    "fixedCode": "Corrected code for line 15"
  }
]
"#;

/// A parsed stack trace plus the rendered source window around it.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub locator: ErrorLocator,
    pub window: String,
}

fn task_line(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(desc) => format!("Fix this specific issue: {}", desc),
        None => SCAN_ALL_TASK.to_string(),
    }
}

fn trace_section(trace: Option<&TraceContext>) -> String {
    let Some(ctx) = trace else {
        return String::new();
    };
    format!(
        "\nObserved failure: {} at {}:{} ({})\nContext:\n{}\n",
        ctx.locator.exception_category,
        ctx.locator.file_name,
        ctx.locator.line_number,
        ctx.locator.frame,
        ctx.window.trim_end()
    )
}

/// Build the diagnosis prompt sent to the model.
pub fn diagnosis_prompt(
    description: Option<&str>,
    code: &str,
    trace: Option<&TraceContext>,
) -> String {
    DIAGNOSIS_TEMPLATE
        .replace("{task}", &task_line(description))
        .replace("{trace}", &trace_section(trace))
        .replace("{code}", code)
}
