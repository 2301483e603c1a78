//! Clip generation scheduler.
//!
//! Drives the ordered prompt list through the job runner one shot at a
//! time, gated by the quota tracker. Jobs are never reordered or
//! parallelized: the upstream service enforces per-minute and per-day
//! quotas, and sequential submission keeps quota failures attributable to
//! a single job.

use std::time::Duration;

use tracing::{info, warn};

use reelforge_models::{ClipManifest, ClipManifestEntry, ShotPrompt};

use crate::client::VideoGenerator;
use crate::quota::QuotaTracker;
use crate::runner::JobRunner;

/// Default pause after a successful job, to avoid bursting the service.
pub const DEFAULT_SUCCESS_COOLDOWN: Duration = Duration::from_secs(2);

/// Sequential scheduler producing the clip manifest.
pub struct ClipScheduler<G> {
    runner: JobRunner<G>,
    quota: QuotaTracker,
    success_cooldown: Duration,
}

impl<G: VideoGenerator> ClipScheduler<G> {
    pub fn new(runner: JobRunner<G>, quota: QuotaTracker) -> Self {
        Self {
            runner,
            quota,
            success_cooldown: DEFAULT_SUCCESS_COOLDOWN,
        }
    }

    pub fn with_success_cooldown(mut self, cooldown: Duration) -> Self {
        self.success_cooldown = cooldown;
        self
    }

    /// Generate clips for every prompt, in order.
    ///
    /// Completes after the last prompt no matter how many jobs failed;
    /// partial success is a normal, reportable outcome.
    pub async fn generate_all(&mut self, prompts: &[ShotPrompt]) -> ClipManifest {
        let mut manifest = ClipManifest::new();

        info!("Generating {} clips", prompts.len());

        for prompt in prompts {
            // Fail fast while the quota cooldown is running; no wasted calls.
            if !self.quota.is_available() {
                warn!(shot = prompt.shot_index, "Quota exhausted, skipping shot");
                manifest.push(ClipManifestEntry::skipped_quota(
                    prompt.shot_index,
                    prompt.duration_seconds,
                ));
                continue;
            }

            let job = self.runner.run(prompt).await;

            if job.is_completed() {
                self.quota.record_success();
            } else if let Some(kind) = job.failure {
                self.quota.record_failure(kind);
            }

            let completed = job.is_completed();
            manifest.push(ClipManifestEntry::from_job(&job, prompt.duration_seconds));

            if completed {
                tokio::time::sleep(self.success_cooldown).await;
            }
        }

        let summary = manifest.summary();
        info!(
            "Generation complete: {}/{} clips succeeded ({} retries consumed, {} quota-skipped)",
            summary.successful_shots,
            summary.total_shots,
            summary.total_retries,
            summary.quota_skipped
        );

        manifest
    }
}
