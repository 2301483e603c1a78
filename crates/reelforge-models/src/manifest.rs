//! The clip manifest handed from the scheduler to the assembly engine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{FailureKind, GenerationJob};

/// Final outcome of one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    Completed,
    Failed,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Completed => "completed",
            ClipStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One shot's outcome as recorded in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipManifestEntry {
    /// 1-based shot index
    pub shot_index: u32,

    /// Final state of the shot's job
    pub status: ClipStatus,

    /// Clip file path (present iff completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Target duration in seconds; assembly probes completed clips for
    /// the encoded duration and falls back to this value
    pub duration_seconds: f64,

    /// Retries consumed beyond the initial attempt
    #[serde(default)]
    pub retry_count: u32,

    /// Failure classification (present iff failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    /// Human-readable error (present iff failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClipManifestEntry {
    /// Build an entry from a terminal generation job.
    pub fn from_job(job: &GenerationJob, duration_seconds: f64) -> Self {
        Self {
            shot_index: job.shot_index,
            status: if job.is_completed() {
                ClipStatus::Completed
            } else {
                ClipStatus::Failed
            },
            file_path: job.output_path.clone(),
            duration_seconds,
            retry_count: job.retry_count(),
            failure: job.failure,
            error_message: job.error_message.clone(),
        }
    }

    /// Entry for a shot the scheduler never submitted because quota was
    /// exhausted.
    pub fn skipped_quota(shot_index: u32, duration_seconds: f64) -> Self {
        Self {
            shot_index,
            status: ClipStatus::Failed,
            file_path: None,
            duration_seconds,
            retry_count: 0,
            failure: Some(FailureKind::SkippedQuota),
            error_message: Some("Skipped due to quota exhaustion".to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ClipStatus::Completed
    }
}

/// Aggregate statistics for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationSummary {
    pub total_shots: usize,
    pub successful_shots: usize,
    pub failed_shots: usize,
    pub quota_skipped: usize,
    pub total_retries: u32,
}

/// Ordered record of per-shot generation outcomes.
///
/// Append-only while the scheduler runs, read-only afterward. The sole
/// handoff artifact between generation and assembly; also persisted as
/// JSON for inspection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipManifest {
    /// Unique run identifier
    pub run_id: String,

    /// When the generation run started
    pub created_at: DateTime<Utc>,

    /// Per-shot outcomes in shot-index order
    pub entries: Vec<ClipManifestEntry>,
}

impl ClipManifest {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ClipManifestEntry) {
        self.entries.push(entry);
    }

    /// Entries that completed, in shot order.
    pub fn successful(&self) -> impl Iterator<Item = &ClipManifestEntry> {
        self.entries.iter().filter(|e| e.is_completed())
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.successful().count()
    }

    /// Summary block embedded in the persisted manifest.
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            total_shots: self.total(),
            successful_shots: self.succeeded(),
            failed_shots: self.total() - self.succeeded(),
            quota_skipped: self
                .entries
                .iter()
                .filter(|e| e.failure == Some(FailureKind::SkippedQuota))
                .count(),
            total_retries: self.entries.iter().map(|e| e.retry_count).sum(),
        }
    }

    /// Persist the manifest as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load a previously persisted manifest.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl Default for ClipManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(shot: u32) -> ClipManifestEntry {
        ClipManifestEntry {
            shot_index: shot,
            status: ClipStatus::Completed,
            file_path: Some(PathBuf::from(format!("/tmp/shot_{:03}.mp4", shot))),
            duration_seconds: 5.0,
            retry_count: 0,
            failure: None,
            error_message: None,
        }
    }

    fn failed(shot: u32, kind: FailureKind) -> ClipManifestEntry {
        ClipManifestEntry {
            shot_index: shot,
            status: ClipStatus::Failed,
            file_path: None,
            duration_seconds: 5.0,
            retry_count: 2,
            failure: Some(kind),
            error_message: Some("boom".into()),
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut manifest = ClipManifest::new();
        manifest.push(completed(1));
        manifest.push(failed(2, FailureKind::Permanent));
        manifest.push(completed(3));
        manifest.push(ClipManifestEntry::skipped_quota(4, 5.0));

        let summary = manifest.summary();
        assert_eq!(summary.total_shots, 4);
        assert_eq!(summary.successful_shots, 2);
        assert_eq!(summary.failed_shots, 2);
        assert_eq!(summary.quota_skipped, 1);
        assert_eq!(summary.total_retries, 2);
    }

    #[test]
    fn test_successful_preserves_order() {
        let mut manifest = ClipManifest::new();
        manifest.push(completed(1));
        manifest.push(failed(2, FailureKind::TransientNetwork));
        manifest.push(completed(3));

        let shots: Vec<u32> = manifest.successful().map(|e| e.shot_index).collect();
        assert_eq!(shots, vec![1, 3]);
    }

    #[test]
    fn test_skipped_quota_entry() {
        let entry = ClipManifestEntry::skipped_quota(7, 4.0);
        assert_eq!(entry.status, ClipStatus::Failed);
        assert_eq!(entry.failure, Some(FailureKind::SkippedQuota));
        assert!(entry.file_path.is_none());
        assert_eq!(entry.retry_count, 0);
    }

    #[test]
    fn test_manifest_json_roundtrip() {
        let mut manifest = ClipManifest::new();
        manifest.push(completed(1));
        manifest.push(failed(2, FailureKind::QuotaExceeded));

        let json = serde_json::to_string(&manifest).unwrap();
        let restored: ClipManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.entries.len(), 2);
        assert_eq!(restored.entries[1].failure, Some(FailureKind::QuotaExceeded));
        assert_eq!(restored.run_id, manifest.run_id);
    }
}
