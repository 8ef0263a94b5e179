//! Agent and task construction.

use super::definition::{CrewDefinition, REQUIREMENTS_VAR};
use super::template::{Template, vars};
use crate::error::{Result, TestgenError};
use crate::llm::{ChatMessage, ChatModel, Completion};
use std::sync::Arc;

/// A persona bound to the shared chat model.
#[derive(Clone)]
pub struct Agent {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    llm: Arc<dyn ChatModel>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("model", &self.llm.model_name())
            .finish()
    }
}

impl Agent {
    /// System message establishing the persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role,
            self.backstory.trim(),
            self.goal.trim()
        )
    }

    /// Send one user prompt under this agent's persona.
    pub fn perform(&self, prompt: &str) -> Result<Completion> {
        let messages = [
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(prompt),
        ];
        self.llm.complete(&messages)
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}

/// A prompt assigned to an agent, ready to run.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub agent: Agent,
    /// Fully rendered description.
    pub description: String,
    pub expected_output: String,
    pub section: String,
    pub output_file: String,
    pub dependencies: Vec<String>,
}

/// Build one agent per definition entry, all sharing `llm`.
pub fn build_agents(definition: &CrewDefinition, llm: Arc<dyn ChatModel>) -> Vec<Agent> {
    definition
        .agents
        .iter()
        .map(|(id, spec)| Agent {
            id: id.clone(),
            role: spec.role.trim().to_string(),
            goal: spec.goal.clone(),
            backstory: spec.backstory.clone(),
            llm: Arc::clone(&llm),
        })
        .collect()
}

/// Build the task chain in declared order.
///
/// The first task's description is rendered with the requirements text;
/// later descriptions are rendered with no variables.
pub fn build_tasks(
    definition: &CrewDefinition,
    agents: &[Agent],
    requirements: &str,
) -> Result<Vec<Task>> {
    let first_vars = vars([(REQUIREMENTS_VAR, requirements)]);
    let no_vars = vars(std::iter::empty::<(String, String)>());

    definition
        .tasks
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let agent = agents
                .iter()
                .find(|a| a.id == spec.agent)
                .cloned()
                .ok_or_else(|| {
                    TestgenError::Crew(format!(
                        "task '{}' references unknown agent '{}'",
                        spec.id, spec.agent
                    ))
                })?;

            let variables = if index == 0 { &first_vars } else { &no_vars };
            let description = Template::parse(&spec.description)
                .and_then(|t| t.render(variables))
                .map_err(|e| TestgenError::Template(format!("task '{}': {}", spec.id, e)))?;

            Ok(Task {
                id: spec.id.clone(),
                agent,
                description,
                expected_output: spec.expected_output.trim().to_string(),
                section: spec.section.clone(),
                output_file: spec.output_file.clone(),
                dependencies: spec.dependencies.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeModel;

    fn fake() -> Arc<dyn ChatModel> {
        Arc::new(FakeModel::replying(Vec::<String>::new()))
    }

    #[test]
    fn test_agents_share_one_model() {
        let definition = CrewDefinition::builtin().unwrap();
        let llm = fake();
        let agents = build_agents(&definition, Arc::clone(&llm));

        assert_eq!(agents.len(), 4);
        // One handle per agent plus the local one.
        assert_eq!(Arc::strong_count(&llm), 5);
        assert!(agents.iter().all(|a| a.model_name() == "fake"));
    }

    #[test]
    fn test_system_prompt_carries_persona() {
        let definition = CrewDefinition::builtin().unwrap();
        let agents = build_agents(&definition, fake());
        let analyst = agents
            .iter()
            .find(|a| a.id == "requirements_analyst")
            .unwrap();

        let prompt = analyst.system_prompt();
        assert!(prompt.starts_with("You are Requirements Analyst. You are a senior"));
        assert!(prompt.contains("Your personal goal is: Analyze the provided"));
    }

    #[test]
    fn test_first_task_gets_requirements() {
        let definition = CrewDefinition::builtin().unwrap();
        let agents = build_agents(&definition, fake());
        let tasks = build_tasks(&definition, &agents, "REQ-1 Users can reset { passwords }.").unwrap();

        assert_eq!(tasks.len(), 4);
        assert!(
            tasks[0]
                .description
                .contains("document:\nREQ-1 Users can reset { passwords }.\n")
        );
        assert_eq!(tasks[0].agent.role, "Requirements Analyst");
        for task in &tasks[1..] {
            assert!(!task.description.contains("REQ-1"));
        }
    }

    #[test]
    fn test_escaped_braces_are_rendered_in_later_tasks() {
        let definition = CrewDefinition::builtin().unwrap();
        let agents = build_agents(&definition, fake());
        let tasks = build_tasks(&definition, &agents, "").unwrap();

        let data_task = tasks.iter().find(|t| t.id == "generate_test_data").unwrap();
        assert!(data_task.description.contains("{\"test_data_sets\": [{\"test_case_id\""));
        assert_eq!(data_task.agent.role, "Test Data Engineer");
    }

    #[test]
    fn test_unknown_agent_in_factory() {
        let definition = CrewDefinition::builtin().unwrap();
        let agents = build_agents(&definition, fake());
        let err = build_tasks(&definition, &agents[..1], "x").unwrap_err();
        assert!(matches!(err, TestgenError::Crew(_)));
    }

    #[test]
    fn test_perform_sends_system_then_user() {
        let definition = CrewDefinition::builtin().unwrap();
        let model = Arc::new(FakeModel::replying(["ok"]));
        let agents = build_agents(&definition, model.clone());

        let completion = agents[0].perform("Do the thing").unwrap();
        assert_eq!(completion.text, "ok");

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], ChatMessage::system(agents[0].system_prompt()));
        assert_eq!(calls[0][1], ChatMessage::user("Do the thing"));
    }
}
