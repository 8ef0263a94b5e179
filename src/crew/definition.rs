//! Crew definition schema.
//!
//! A crew definition names the agents and the ordered task chain. The
//! built-in definition is compiled into the binary; `TESTGEN_CREW_FILE`
//! may point at a replacement with the same schema.
//!
//! # File Format
//!
//! ```yaml
//! agents:
//!   requirements_analyst:
//!     role: Requirements Analyst
//!     goal: Analyze the requirements document.
//!     backstory: You are a senior analyst.
//!
//! tasks:
//!   - id: analyze_requirements
//!     agent: requirements_analyst
//!     section: requirements_analysis
//!     output_file: requirements_analysis.md
//!     description: |
//!       Analyze the following document:
//!       {requirements}
//!     expected_output: A structured analysis.
//!   - id: generate_test_cases
//!     agent: requirements_analyst
//!     section: test_cases
//!     output_file: detailed_test_cases.md
//!     dependencies: [requirements_analysis.md]
//!     description: Write test cases for the analysis.
//!     expected_output: Detailed test cases.
//! ```

use super::template::Template;
use crate::error::{Result, TestgenError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Built-in crew definition.
const BUILTIN_CREW_YAML: &str = include_str!("default_crew.yaml");

/// Placeholder the first task's description is rendered with.
pub const REQUIREMENTS_VAR: &str = "requirements";

/// Agents and tasks making up one crew.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewDefinition {
    /// Agent specs keyed by identifier.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentSpec>,

    /// Tasks in execution order.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// Persona of one agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

/// One step of the task chain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSpec {
    /// Task identifier, unique within the crew.
    pub id: String,

    /// Identifier of the agent performing the task.
    pub agent: String,

    /// Prompt template.
    pub description: String,

    /// Description of the desired answer, appended to the prompt.
    #[serde(default)]
    pub expected_output: String,

    /// Result bundle key the task's output is exported under.
    pub section: String,

    /// File name (inside the run directory) receiving the output.
    pub output_file: String,

    /// Output files of earlier tasks passed along as context.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl CrewDefinition {
    /// The compiled-in four-agent crew.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CREW_YAML)
    }

    /// Load a crew definition from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TestgenError::Config(format!(
                "failed to read crew file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate a crew definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let definition: CrewDefinition = serde_yaml::from_str(yaml)
            .map_err(|e| TestgenError::Config(format!("failed to parse crew YAML: {}", e)))?;

        definition.validate()?;
        Ok(definition)
    }

    /// Validate the definition.
    ///
    /// Validation rules:
    /// - at least one agent and one task
    /// - agent roles and task descriptions are non-empty
    /// - task ids, sections, and output files are unique and non-empty
    /// - output files are plain file names (no directories)
    /// - every task names a defined agent
    /// - dependencies name output files of earlier tasks
    /// - only the first task uses placeholders, and only `{requirements}`
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(invalid("at least one agent is required"));
        }
        if self.tasks.is_empty() {
            return Err(invalid("at least one task is required"));
        }

        for (id, agent) in &self.agents {
            if id.trim().is_empty() {
                return Err(invalid("agent identifier cannot be empty"));
            }
            if agent.role.trim().is_empty() {
                return Err(invalid(&format!("agent '{}' has an empty role", id)));
            }
        }

        let mut task_ids = HashSet::new();
        let mut sections = HashSet::new();
        let mut produced: HashSet<&str> = HashSet::new();

        for (index, task) in self.tasks.iter().enumerate() {
            if task.id.trim().is_empty() {
                return Err(invalid(&format!("task #{} has an empty id", index + 1)));
            }
            if !task_ids.insert(task.id.as_str()) {
                return Err(invalid(&format!("duplicate task id '{}'", task.id)));
            }
            if task.description.trim().is_empty() {
                return Err(invalid(&format!("task '{}' has an empty description", task.id)));
            }
            if !self.agents.contains_key(&task.agent) {
                return Err(invalid(&format!(
                    "task '{}' references unknown agent '{}'",
                    task.id, task.agent
                )));
            }
            if task.section.trim().is_empty() {
                return Err(invalid(&format!("task '{}' has an empty section", task.id)));
            }
            if !sections.insert(task.section.as_str()) {
                return Err(invalid(&format!("duplicate section '{}'", task.section)));
            }
            validate_output_file(task)?;

            for dependency in &task.dependencies {
                if !produced.contains(dependency.as_str()) {
                    return Err(invalid(&format!(
                        "task '{}' depends on '{}', which no earlier task produces",
                        task.id, dependency
                    )));
                }
            }
            if !produced.insert(task.output_file.as_str()) {
                return Err(invalid(&format!(
                    "output file '{}' is produced by more than one task",
                    task.output_file
                )));
            }

            let template = Template::parse(&task.description).map_err(|e| {
                TestgenError::Template(format!("task '{}' description: {}", task.id, e))
            })?;
            let allowed: &[&str] = if index == 0 { &[REQUIREMENTS_VAR] } else { &[] };
            if let Some(unknown) = template
                .placeholders()
                .into_iter()
                .find(|name| !allowed.contains(name))
            {
                return Err(TestgenError::Template(format!(
                    "task '{}' description uses unsupported placeholder '{{{}}}'",
                    task.id, unknown
                )));
            }
        }

        Ok(())
    }
}

fn validate_output_file(task: &TaskSpec) -> Result<()> {
    let name = task.output_file.trim();
    if name.is_empty() {
        return Err(invalid(&format!("task '{}' has an empty output_file", task.id)));
    }

    let plain = Path::new(name)
        .file_name()
        .map(|f| f == std::ffi::OsStr::new(name))
        .unwrap_or(false);
    if !plain || name.contains(['/', '\\']) {
        return Err(invalid(&format!(
            "task '{}' output_file '{}' must be a plain file name",
            task.id, task.output_file
        )));
    }

    Ok(())
}

fn invalid(message: &str) -> TestgenError {
    TestgenError::Crew(format!("crew definition is invalid: {}", message))
}
