//! Filesystem utilities for testgen.
//!
//! Artifacts are written through [`atomic_write`] so a crashed run never
//! leaves a half-written Markdown, JSON, or Word file behind.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file, ensure_dir};
