//! End-to-end prompt-to-video pipeline.
//!
//! This crate provides:
//! - Environment-based pipeline configuration
//! - Orchestration of generation, manifest persistence, and assembly
//! - The `reelforge-pipeline` binary

pub mod config;
pub mod error;
pub mod run;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use run::{load_script, run_pipeline, PipelineReport, MANIFEST_FILENAME, REPORT_FILENAME};
