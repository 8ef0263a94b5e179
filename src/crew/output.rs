//! Task output records and file normalisation.

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$")
        .expect("Invalid code fence regex")
});

/// Output of one executed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent_role: String,
    pub section: String,
    pub output_file: String,
    /// Text exactly as returned by the model.
    pub raw: String,
    /// Content written to `output_file`.
    pub written: String,
}

/// Outputs of a whole crew run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Raw text of the last task, the crew's final answer.
    pub fn final_output(&self) -> &str {
        self.tasks.last().map(|t| t.raw.as_str()).unwrap_or("")
    }

    /// Output of the task exported under `section`.
    pub fn by_section(&self, section: &str) -> Option<&TaskOutput> {
        self.tasks.iter().find(|t| t.section == section)
    }
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Content to store for a `.json` output file.
///
/// Fenced or bare JSON is pretty-printed; anything else is wrapped as
/// `{"raw": text}` so the file always holds valid JSON.
pub fn normalize_json_output(raw: &str) -> String {
    let candidate = strip_code_fence(raw);
    let value = serde_json::from_str::<Value>(candidate).unwrap_or_else(|_| json!({ "raw": raw }));
    // Serializing a Value cannot fail.
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

/// Content to store for `output_file` given the model's raw text.
pub fn content_for_file(output_file: &str, raw: &str) -> String {
    if output_file.to_ascii_lowercase().ends_with(".json") {
        normalize_json_output(raw)
    } else {
        let mut text = raw.trim_end().to_string();
        text.push('\n');
        text
    }
}
