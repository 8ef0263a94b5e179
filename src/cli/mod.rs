//! CLI argument parsing for testgen.
//!
//! Uses clap derive macros for the single positional argument. Anything
//! other than exactly one argument is a usage error, reported with the
//! fixed usage line instead of clap's own diagnostics.

use crate::error::{Result, TestgenError};
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

/// Printed to stdout whenever the argument count is wrong.
pub const USAGE: &str = "Usage: testgen <requirements_file_path>";

/// Testgen: generate test cases from a Word requirements document.
///
/// The document is analysed by a crew of four LLM agents (requirements
/// analyst, test case engineer, test data engineer, validator). Their
/// outputs land in a new `test_artifacts_<timestamp>` directory.
#[derive(Parser, Debug)]
#[command(name = "testgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the `.docx` requirements document.
    pub requirements_file: PathBuf,
}

impl Cli {
    /// Parse the process arguments.
    pub fn parse_args() -> Result<Self> {
        Self::parse_args_from(std::env::args_os())
    }

    /// Parse an explicit argument list (first item is the program name).
    ///
    /// `--help` and `--version` print and exit the process the way clap
    /// normally does; every other parse failure becomes a usage error.
    pub fn parse_args_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(_) => Err(TestgenError::Usage(USAGE.to_string())),
        }
    }
}
