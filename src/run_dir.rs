//! Per-run artifact directory.
//!
//! Every run writes into `test_artifacts_<YYYYMMDD_HHMMSS>/` under the
//! output root, named from local wall-clock time. Two runs starting in the
//! same second share the directory; later writes replace earlier files.

use crate::error::Result;
use crate::fs::ensure_dir;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Prefix of every run directory name.
pub const RUN_DIR_PREFIX: &str = "test_artifacts_";

/// `chrono` format of the timestamp suffix.
pub const RUN_DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Resolved run directory. The path is absolute when the output root is.
#[derive(Debug, Clone)]
pub struct RunDir {
    path: PathBuf,
    started_at: DateTime<Local>,
}

impl RunDir {
    /// Directory name for a run started at `at`.
    pub fn name_for(at: &DateTime<Local>) -> String {
        format!("{}{}", RUN_DIR_PREFIX, at.format(RUN_DIR_TIMESTAMP_FORMAT))
    }

    /// Create the run directory for the current time.
    pub fn create<P: AsRef<Path>>(output_root: P) -> Result<Self> {
        Self::create_at(output_root, Local::now())
    }

    /// Create the run directory for a given start time.
    ///
    /// An existing directory with the same name is reused.
    pub fn create_at<P: AsRef<Path>>(output_root: P, started_at: DateTime<Local>) -> Result<Self> {
        let path = output_root.as_ref().join(Self::name_for(&started_at));
        ensure_dir(&path)?;
        Ok(Self { path, started_at })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Path of an artifact inside the run directory.
    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }
}
