//! Runtime settings for testgen.
//!
//! Settings come from the process environment (after an optional `.env`
//! file has been loaded). Only `OPENAI_API_KEY` is mandatory; every other
//! value has a default and is validated before the pipeline starts.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Settings;
pub use operations::load_dotenv;
