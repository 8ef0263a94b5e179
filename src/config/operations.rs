//! Settings loading and validation.

use super::model::Settings;
use super::types::*;
use crate::error::{Result, TestgenError};
use std::path::PathBuf;

impl Settings {
    /// Read settings from the process environment.
    ///
    /// Fails when `OPENAI_API_KEY` is unset or blank, or when an optional
    /// variable holds a value that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get(ENV_API_KEY).ok_or_else(|| {
            TestgenError::Config(format!(
                "{} is missing. Ensure it is set in the environment or .env file.",
                ENV_API_KEY
            ))
        })?;

        let temperature = match get(ENV_TEMPERATURE) {
            Some(raw) => raw.parse::<f32>().map_err(|e| {
                TestgenError::Config(format!(
                    "{} must be a number, got '{}': {}",
                    ENV_TEMPERATURE, raw, e
                ))
            })?,
            None => default_temperature(),
        };

        let timeout_seconds = match get(ENV_TIMEOUT_SECONDS) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                TestgenError::Config(format!(
                    "{} must be a whole number of seconds, got '{}': {}",
                    ENV_TIMEOUT_SECONDS, raw, e
                ))
            })?,
            None => default_timeout_seconds(),
        };

        let settings = Settings {
            api_key,
            model: get(ENV_MODEL).unwrap_or_else(default_model),
            temperature,
            base_url: get(ENV_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(default_base_url),
            timeout_seconds,
            output_root: get(ENV_OUTPUT_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(default_output_root),
            crew_file: get(ENV_CREW_FILE).map(PathBuf::from),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values.
    ///
    /// Validation rules:
    /// - `temperature` must be within `0.0..=2.0`
    /// - `timeout_seconds` must be positive
    /// - `base_url` must be an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(TestgenError::Config(format!(
                "{} must be between 0.0 and {}, got {}",
                ENV_TEMPERATURE, MAX_TEMPERATURE, self.temperature
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(TestgenError::Config(format!(
                "{} must be greater than 0",
                ENV_TIMEOUT_SECONDS
            )));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TestgenError::Config(format!(
                "{} must start with http:// or https://, got '{}'",
                ENV_BASE_URL, self.base_url
            )));
        }

        Ok(())
    }

    /// Full URL of the chat-completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Load a `.env` file from the working directory or one of its parents.
///
/// A missing file is not an error; variables already present in the
/// environment are never overridden.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(TestgenError::Config(format!("failed to load .env file: {}", e))),
    }
}
