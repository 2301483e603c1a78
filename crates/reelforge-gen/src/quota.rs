//! Quota exhaustion tracking for the generation service.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use reelforge_models::FailureKind;

/// Default consecutive quota failures before the tracker trips.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default cooldown before submissions resume.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Tracks whether the generation service is believed to be quota-exhausted.
///
/// Passed by mutable reference into the scheduler; access is strictly
/// sequential so no locking is needed. After the cooldown elapses the
/// tracker re-arms once and submissions resume optimistically.
#[derive(Debug)]
pub struct QuotaTracker {
    failure_threshold: u32,
    cooldown: Duration,
    consecutive_failures: u32,
    exhausted_at: Option<Instant>,
}

impl QuotaTracker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold,
            cooldown,
            consecutive_failures: 0,
            exhausted_at: None,
        }
    }

    /// Whether a new job may be submitted.
    ///
    /// Clears the exhausted flag once the cooldown has elapsed (single
    /// optimistic re-arm).
    pub fn is_available(&mut self) -> bool {
        match self.exhausted_at {
            None => true,
            Some(at) if at.elapsed() >= self.cooldown => {
                info!("Quota cooldown elapsed, resuming submissions");
                self.exhausted_at = None;
                self.consecutive_failures = 0;
                true
            }
            Some(at) => {
                let remaining = self.cooldown.saturating_sub(at.elapsed());
                info!(
                    "Quota exhausted, {:.0} minutes until retry",
                    remaining.as_secs_f64() / 60.0
                );
                false
            }
        }
    }

    /// Record a successful job; resets the consecutive counter.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Record a failed job.
    ///
    /// Only quota-classified failures escalate; anything else breaks the
    /// streak.
    pub fn record_failure(&mut self, kind: FailureKind) {
        if !kind.escalates_quota() {
            self.consecutive_failures = 0;
            return;
        }

        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.failure_threshold && self.exhausted_at.is_none() {
            warn!(
                "{} consecutive quota failures, suspending submissions for {:.0} minutes",
                self.consecutive_failures,
                self.cooldown.as_secs_f64() / 60.0
            );
            self.exhausted_at = Some(Instant::now());
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted_at.is_some()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }
}
