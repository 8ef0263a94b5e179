//! Exit code constants for the testgen CLI.
//!
//! The process only distinguishes success from failure:
//! - 0: Success
//! - 1: Any failure (usage, configuration, document, model, or disk errors)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Any failure, including a wrong argument count.
pub const FAILURE: i32 = 1;
