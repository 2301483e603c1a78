//! Retry policy with exponential backoff.

use rand::Rng;
use std::time::Duration;

use reelforge_models::FailureKind;

/// Default attempts per job, including the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(30);

/// Default cap on the backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

/// Jitter fraction added on top of the exponential delay.
const JITTER_FRACTION: f64 = 0.1;

/// Retry policy applied imperatively inside the job runner.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per job (initial attempt included).
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt).
    pub base_delay: Duration,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Whether a job that has made `attempts` submissions and failed with
    /// `kind` should be resubmitted.
    pub fn should_retry(&self, kind: FailureKind, attempts: u32) -> bool {
        kind.is_retryable() && attempts < self.max_retries
    }

    /// Backoff delay before retry number `attempt` (0-based), with jitter
    /// to avoid synchronized resubmission.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);

        let jitter = exp.mul_f64(rand::rng().random_range(0.0..JITTER_FRACTION));
        exp + jitter
    }
}
