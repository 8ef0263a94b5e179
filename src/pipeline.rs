//! End-to-end generation pipeline.
//!
//! A straight line: read the requirements document, assemble the crew,
//! run it into a fresh artifact directory, export the summaries. Every
//! stage is logged; the first error aborts the run and is logged as
//! `run_failed` before it is returned.

use crate::config::Settings;
use crate::crew::{Crew, CrewDefinition, build_agents, build_tasks};
use crate::document::read_requirements;
use crate::error::Result;
use crate::events::{Event, EventAction, RunLog};
use crate::export::{ResultBundle, export_all};
use crate::llm::{ChatModel, OpenAiChat};
use crate::run_dir::RunDir;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a successful run produced; printed as the stdout JSON line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub status: &'static str,
    pub output_directory: PathBuf,
    pub word_file_path: PathBuf,
    pub json_file_path: PathBuf,
    /// Every artifact file name in the run directory.
    pub files: Vec<String>,
    /// The generated test cases, or the crew's final answer when no task
    /// produced a `test_cases` section.
    pub test_cases: String,
}

/// Run the pipeline against the configured chat-completion API.
pub fn run(input: &Path, settings: &Settings) -> Result<RunSummary> {
    let llm: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(settings)?);
    run_with_model(input, settings, llm)
}

/// Run the pipeline with an explicit chat model.
pub fn run_with_model(
    input: &Path,
    settings: &Settings,
    llm: Arc<dyn ChatModel>,
) -> Result<RunSummary> {
    let log = RunLog::in_dir(&settings.output_root);
    log.append(&Event::new(EventAction::RunStarted).with_details(json!({
        "input": input.display().to_string(),
        "model": llm.model_name(),
    })))?;

    match execute(input, settings, llm, &log) {
        Ok(summary) => {
            log.append(&Event::new(EventAction::RunCompleted).with_details(json!({
                "output_directory": summary.output_directory.display().to_string(),
            })))?;
            Ok(summary)
        }
        Err(err) => {
            // Keep the run error even if logging it fails.
            let _ = log.append(
                &Event::error(EventAction::RunFailed).with_details(json!({
                    "error": err.to_string(),
                })),
            );
            Err(err)
        }
    }
}

fn execute(
    input: &Path,
    settings: &Settings,
    llm: Arc<dyn ChatModel>,
    log: &RunLog,
) -> Result<RunSummary> {
    let requirements = read_requirements(input)?;
    log.append(&Event::new(EventAction::DocumentLoaded).with_details(json!({
        "characters": requirements.chars().count(),
        "lines": requirements.lines().count(),
    })))?;

    let definition = match &settings.crew_file {
        Some(path) => CrewDefinition::load(path)?,
        None => CrewDefinition::builtin()?,
    };
    let agents = build_agents(&definition, llm);
    let tasks = build_tasks(&definition, &agents, &requirements)?;
    let crew = Crew::new(agents, tasks);
    log.append(&Event::new(EventAction::CrewAssembled).with_details(json!({
        "agents": crew.agents().iter().map(|a| a.role.as_str()).collect::<Vec<_>>(),
        "tasks": crew.tasks().iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        "crew_file": settings.crew_file.as_ref().map(|p| p.display().to_string()),
    })))?;

    let run_dir = RunDir::create(&settings.output_root)?;
    let output = crew.kickoff(&run_dir, log)?;

    let bundle = ResultBundle::from_crew_output(&output);
    let exported = export_all(&bundle, &output, &run_dir, input)?;

    let mut files: Vec<String> = output.tasks.iter().map(|t| t.output_file.clone()).collect();
    for path in [&exported.word, &exported.json] {
        if let Some(name) = path.file_name() {
            files.push(name.to_string_lossy().into_owned());
        }
    }

    log.append(&Event::new(EventAction::ArtifactsExported).with_details(json!({
        "directory": run_dir.path().display().to_string(),
        "files": files,
    })))?;

    let test_cases = output
        .by_section("test_cases")
        .map(|t| t.raw.clone())
        .unwrap_or_else(|| output.final_output().to_string());

    Ok(RunSummary {
        status: "success",
        output_directory: run_dir.path().to_path_buf(),
        word_file_path: exported.word,
        json_file_path: exported.json,
        files,
        test_cases,
    })
}
