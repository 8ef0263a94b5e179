//! Settings struct definition.

use std::path::PathBuf;

/// Resolved settings for one run.
#[derive(Clone)]
pub struct Settings {
    /// API credential sent as a bearer token.
    pub api_key: String,

    /// Chat model identifier (default: "gpt-4-turbo").
    pub model: String,

    /// Sampling temperature (default: 0.1).
    pub temperature: f32,

    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,

    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,

    /// Directory holding run directories and the lifecycle log.
    pub output_root: PathBuf,

    /// Crew definition override, if any.
    pub crew_file: Option<PathBuf>,
}

// The API key never reaches logs or error output through Debug.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("output_root", &self.output_root)
            .field("crew_file", &self.crew_file)
            .finish()
    }
}
