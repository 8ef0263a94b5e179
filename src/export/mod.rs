//! Result export.
//!
//! Turns a crew run into the two summary artifacts:
//!
//! - `Generated_Test_Cases.docx`: one heading and body per section
//! - `test_cases_complete.json`: every section's raw text plus run metadata

mod bundle;
mod json;
mod word;


pub use bundle::{ResultBundle, SECTIONS, section_title};
pub use json::{JSON_FILE_NAME, export_json};
pub use word::{WORD_FILE_NAME, build_word_document, export_word};

use crate::crew::CrewOutput;
use crate::error::Result;
use crate::run_dir::RunDir;
use std::path::{Path, PathBuf};

/// Paths of the summary artifacts written by [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub word: PathBuf,
    pub json: PathBuf,
}

/// Write both summary artifacts for a finished crew run.
pub fn export_all(
    bundle: &ResultBundle,
    output: &CrewOutput,
    run_dir: &RunDir,
    source_document: &Path,
) -> Result<ExportedFiles> {
    let word = run_dir.artifact(WORD_FILE_NAME);
    export_word(bundle, &word)?;

    let json = run_dir.artifact(JSON_FILE_NAME);
    export_json(bundle, output, run_dir, source_document, &json)?;

    Ok(ExportedFiles { word, json })
}
