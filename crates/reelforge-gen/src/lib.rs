//! Clip generation against an external text-to-video service.
//!
//! This crate provides:
//! - The [`VideoGenerator`] service boundary and its [`VeoClient`] and
//!   [`MockGenerator`] implementations
//! - Quota exhaustion tracking
//! - The per-job retry policy and runner
//! - The sequential clip scheduler producing the manifest

pub mod client;
pub mod error;
pub mod mock;
pub mod quota;
pub mod retry;
pub mod runner;
pub mod scheduler;

pub use client::{PollStatus, SubmitTicket, VeoClient, VideoGenerator, API_KEY_ENV};
pub use error::{GenError, GenResult};
pub use mock::MockGenerator;
pub use quota::QuotaTracker;
pub use retry::RetryPolicy;
pub use runner::{clip_filename, JobRunner};
pub use scheduler::ClipScheduler;
