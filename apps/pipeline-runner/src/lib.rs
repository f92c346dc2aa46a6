//! Pipeline Runner - end-to-end compliance analysis of one document
//!
//! Acquire -> extract requirements -> retrieve context and generate test
//! cases per requirement -> score and detect violations -> JSON report.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;

pub use config::{CliArgs, FailurePolicy, PipelineConfig};
pub use error::PipelineError;
pub use orchestrator::{Capabilities, Pipeline};
pub use output::{publish_report, upload_report, write_report, OutputLocation};
