//! JSON export of the result bundle.

use super::bundle::ResultBundle;
use crate::crew::CrewOutput;
use crate::error::{Result, TestgenError};
use crate::fs::atomic_write_file;
use crate::run_dir::RunDir;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

/// File name of the JSON export.
pub const JSON_FILE_NAME: &str = "test_cases_complete.json";

#[derive(Serialize)]
struct CompleteExport<'a> {
    generated_at: String,
    run_started_at: String,
    source_document: String,
    sections: &'a ResultBundle,
    tasks: Vec<TaskSummary<'a>>,
    final_output: &'a str,
}

#[derive(Serialize)]
struct TaskSummary<'a> {
    task_id: &'a str,
    agent_role: &'a str,
    section: &'a str,
    output_file: &'a str,
}

/// Write the bundle and run metadata as pretty JSON to `path`.
pub fn export_json<P: AsRef<Path>>(
    bundle: &ResultBundle,
    output: &CrewOutput,
    run_dir: &RunDir,
    source_document: &Path,
    path: P,
) -> Result<()> {
    let export = CompleteExport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        run_started_at: run_dir.started_at().to_rfc3339_opts(SecondsFormat::Secs, false),
        source_document: source_document.display().to_string(),
        sections: bundle,
        tasks: output
            .tasks
            .iter()
            .map(|t| TaskSummary {
                task_id: &t.task_id,
                agent_role: &t.agent_role,
                section: &t.section,
                output_file: &t.output_file,
            })
            .collect(),
        final_output: output.final_output(),
    };

    let mut content = serde_json::to_string_pretty(&export)
        .map_err(|e| TestgenError::Io(format!("failed to serialize {}: {}", JSON_FILE_NAME, e)))?;
    content.push('\n');

    atomic_write_file(path, &content)
}
