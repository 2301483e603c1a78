//! Shared data models for the Reelforge pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Shot prompts and the script input document
//! - Generation jobs and their state machine
//! - Failure classification
//! - The clip manifest handed from scheduler to assembly
//! - Renditions, encoding configuration, and assembly results

pub mod assembly;
pub mod encoding;
pub mod failure;
pub mod job;
pub mod manifest;
pub mod prompt;
pub mod utils;

// Re-export common types
pub use assembly::{AssemblyMetadata, AssemblyResult, Rendition};
pub use encoding::EncodingConfig;
pub use failure::{classify_markers, FailureKind};
pub use job::{GenerationJob, ShotJobState};
pub use manifest::{ClipManifest, ClipManifestEntry, ClipStatus, GenerationSummary};
pub use prompt::{ScriptFile, ShotPrompt};
pub use utils::sanitize_title;
