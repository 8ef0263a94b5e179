//! Sequential crew execution.
//!
//! Tasks run one at a time in declared order. Each task's prompt carries
//! the contents of the files it depends on, so a dependency must have been
//! produced by an earlier task of the same run. The first model error ends
//! the run; nothing is retried.

use super::factory::{Agent, Task};
use super::output::{CrewOutput, TaskOutput, content_for_file};
use crate::error::{Result, TestgenError};
use crate::events::{Event, EventAction, RunLog};
use crate::fs::atomic_write_file;
use crate::run_dir::RunDir;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

/// Agents plus the task chain they execute.
#[derive(Debug)]
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self { agents, tasks }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every task and write each output into `run_dir`.
    pub fn kickoff(&self, run_dir: &RunDir, log: &RunLog) -> Result<CrewOutput> {
        let mut produced: HashMap<&str, String> = HashMap::new();
        let mut output = CrewOutput::default();

        for (index, task) in self.tasks.iter().enumerate() {
            let prompt = build_prompt(task, &produced)?;

            log.append(&Event::new(EventAction::TaskStarted).with_details(json!({
                "task": task.id,
                "agent": task.agent.role,
                "step": format!("{}/{}", index + 1, self.tasks.len()),
                "model": task.agent.model_name(),
            })))?;

            let started = Instant::now();
            let completion = task.agent.perform(&prompt)?;

            let written = content_for_file(&task.output_file, &completion.text);
            let path = run_dir.artifact(&task.output_file);
            atomic_write_file(&path, &written)?;

            log.append(&Event::new(EventAction::TaskCompleted).with_details(json!({
                "task": task.id,
                "output_file": task.output_file,
                "elapsed_ms": started.elapsed().as_millis() as u64,
                "response_model": completion.model,
                "prompt_tokens": completion.prompt_tokens,
                "completion_tokens": completion.completion_tokens,
            })))?;

            produced.insert(task.output_file.as_str(), written.clone());
            output.tasks.push(TaskOutput {
                task_id: task.id.clone(),
                agent_role: task.agent.role.clone(),
                section: task.section.clone(),
                output_file: task.output_file.clone(),
                raw: completion.text,
                written,
            });
        }

        Ok(output)
    }
}

/// Assemble the user prompt for `task` from its description, the contents
/// of its dependencies, and its expected output.
fn build_prompt(task: &Task, produced: &HashMap<&str, String>) -> Result<String> {
    let mut prompt = task.description.trim_end().to_string();

    for dependency in &task.dependencies {
        let content = produced.get(dependency.as_str()).ok_or_else(|| {
            TestgenError::Crew(format!(
                "task '{}' depends on '{}', which has not been produced yet",
                task.id, dependency
            ))
        })?;
        prompt.push_str(&format!(
            "\n\n## Context from {}\n\n{}",
            dependency,
            content.trim_end()
        ));
    }

    if !task.expected_output.is_empty() {
        prompt.push_str(&format!(
            "\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            task.expected_output
        ));
    }

    Ok(prompt)
}
