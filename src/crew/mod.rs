//! The crew: agents, their task chain, and its sequential execution.
//!
//! - **Template**: `{placeholder}` substitution for task descriptions
//! - **Definition**: YAML schema for agents and tasks, built-in or from file
//! - **Factory**: turns a definition into `Agent`s and `Task`s
//! - **Kickoff**: runs the tasks in order and writes their output files
//!
//! A run builds everything fresh: one shared chat model handle, one agent
//! per persona, and one task per step, none of which change afterwards.

pub mod definition;
pub mod factory;
pub mod kickoff;
pub mod output;
pub mod template;

pub use definition::{AgentSpec, CrewDefinition, TaskSpec};
pub use factory::{Agent, Task, build_agents, build_tasks};
pub use kickoff::Crew;
pub use output::{CrewOutput, TaskOutput};
