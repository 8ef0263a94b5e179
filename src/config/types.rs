//! Environment variable names, constants, and default value functions
//! used by the Settings struct.

use std::path::PathBuf;

/// Mandatory API credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Chat model identifier.
pub const ENV_MODEL: &str = "OPENAI_MODEL";

/// Sampling temperature.
pub const ENV_TEMPERATURE: &str = "OPENAI_TEMPERATURE";

/// Base URL of an OpenAI-compatible API.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Per-request HTTP timeout in seconds.
pub const ENV_TIMEOUT_SECONDS: &str = "TESTGEN_TIMEOUT_SECONDS";

/// Directory under which run directories and the log file are created.
pub const ENV_OUTPUT_ROOT: &str = "TESTGEN_OUTPUT_ROOT";

/// Optional crew definition YAML replacing the built-in crew.
pub const ENV_CREW_FILE: &str = "TESTGEN_CREW_FILE";

/// Upper bound accepted for the sampling temperature.
pub const MAX_TEMPERATURE: f32 = 2.0;

pub fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

pub fn default_temperature() -> f32 {
    0.1
}

pub fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_timeout_seconds() -> u64 {
    300
}

pub fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}
