pub mod config;
pub mod error;
pub mod group;
pub mod ingest;
pub mod pipeline;
pub mod render;
pub mod resolve;

pub use config::Settings;
pub use error::PipelineError;
pub use pipeline::{generate, Diagnostic, LoadResult};
