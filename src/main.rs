//! Testgen: generate software test cases from a Word requirements document.
//!
//! This is the main entry point for the `testgen` CLI. It parses the single
//! argument, loads settings, runs the pipeline, and reports the outcome as
//! one JSON line with the matching exit code.

mod cli;
pub mod config;
pub mod crew;
pub mod document;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod export;
pub mod fs;
pub mod llm;
pub mod pipeline;
pub mod run_dir;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::Settings;
use error::{Result, TestgenError};
use pipeline::RunSummary;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            println!("{}", err);
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    match run(&cli) {
        Ok(summary) => match serde_json::to_string(&summary) {
            Ok(line) => {
                println!("{}", line);
                ExitCode::from(exit_codes::SUCCESS as u8)
            }
            Err(e) => fail(TestgenError::Io(format!("failed to encode result: {}", e))),
        },
        Err(err) => fail(err),
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    config::load_dotenv()?;
    let settings = Settings::from_env()?;
    pipeline::run(&cli.requirements_file, &settings)
}

fn fail(err: TestgenError) -> ExitCode {
    eprintln!("{}", err.to_json_line());
    ExitCode::from(err.exit_code() as u8)
}
