//! Generation job state machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::FailureKind;

/// State of a single shot's generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShotJobState {
    /// Not yet submitted (initial state, also re-entered on retry)
    #[default]
    Pending,
    /// Request accepted by the service
    Submitted,
    /// Service returned an async handle; waiting for it to resolve
    Polling,
    /// Artifact downloaded and verified
    Completed,
    /// Terminal failure after retries were exhausted or skipped
    Failed,
}

impl ShotJobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotJobState::Pending => "pending",
            ShotJobState::Submitted => "submitted",
            ShotJobState::Polling => "polling",
            ShotJobState::Completed => "completed",
            ShotJobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ShotJobState::Completed | ShotJobState::Failed)
    }
}

impl std::fmt::Display for ShotJobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One shot's journey through the generation service.
///
/// Created by the scheduler, mutated by the job runner, summarized into a
/// [`crate::ClipManifestEntry`] at the end of the run.
///
/// Invariants: `attempts` never exceeds `max_retries + 1`; `Completed`
/// implies `output_path` names an existing, non-empty file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationJob {
    /// 1-based shot index this job belongs to
    pub shot_index: u32,

    /// Current state
    #[serde(default)]
    pub state: ShotJobState,

    /// Number of submission attempts made so far
    #[serde(default)]
    pub attempts: u32,

    /// Classification of the most recent failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    /// Human-readable error from the most recent failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Async operation handle returned by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Downloaded clip path (set on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl GenerationJob {
    /// Create a fresh pending job for a shot.
    pub fn new(shot_index: u32) -> Self {
        Self {
            shot_index,
            state: ShotJobState::Pending,
            attempts: 0,
            failure: None,
            error_message: None,
            operation: None,
            output_path: None,
        }
    }

    /// Record that a submission attempt has started.
    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.state = ShotJobState::Submitted;
    }

    /// The service accepted the request and returned an async handle.
    pub fn polling(&mut self, operation: impl Into<String>) {
        self.operation = Some(operation.into());
        self.state = ShotJobState::Polling;
    }

    /// Artifact downloaded; the job is done.
    pub fn complete(&mut self, output_path: PathBuf) {
        self.output_path = Some(output_path);
        self.failure = None;
        self.error_message = None;
        self.state = ShotJobState::Completed;
    }

    /// Terminal failure.
    pub fn fail(&mut self, kind: FailureKind, message: impl Into<String>) {
        self.failure = Some(kind);
        self.error_message = Some(message.into());
        self.state = ShotJobState::Failed;
    }

    /// Schedule another attempt after a transient failure.
    pub fn reset_for_retry(&mut self, kind: FailureKind, message: impl Into<String>) {
        self.failure = Some(kind);
        self.error_message = Some(message.into());
        self.operation = None;
        self.state = ShotJobState::Pending;
    }

    /// Retries consumed beyond the initial attempt.
    pub fn retry_count(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    pub fn is_completed(&self) -> bool {
        self.state == ShotJobState::Completed
    }
}
