//! Failure classification for generation jobs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a generation failure.
///
/// Drives the retry policy and the quota tracker: transient kinds are
/// retried with backoff, quota failures additionally escalate the
/// tracker's consecutive-failure counter, and permanent kinds fail the
/// job on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Local validation rejected the prompt; the service was never called
    InvalidInput,
    /// Connectivity-level failure talking to the service
    TransientNetwork,
    /// The poll loop exceeded its wall-clock ceiling
    Timeout,
    /// The service refused the request due to rate/quota/billing limits
    QuotaExceeded,
    /// The service explicitly rejected the request content
    Permanent,
    /// The scheduler skipped the shot while quota was exhausted
    SkippedQuota,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::TransientNetwork => "transient_network",
            FailureKind::Timeout => "timeout",
            FailureKind::QuotaExceeded => "quota_exceeded",
            FailureKind::Permanent => "permanent",
            FailureKind::SkippedQuota => "skipped_quota",
        }
    }

    /// Whether a job failing with this kind may be resubmitted.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::TransientNetwork | FailureKind::Timeout | FailureKind::QuotaExceeded
        )
    }

    /// Whether this kind bumps the quota tracker's consecutive counter.
    pub fn escalates_quota(&self) -> bool {
        matches!(self, FailureKind::QuotaExceeded)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Markers the generation service uses for rate/quota/billing limits.
const QUOTA_MARKERS: &[&str] = &[
    "429",
    "resource_exhausted",
    "quota",
    "rate limit",
    "exceeded",
    "billing",
    "plan",
];

/// Markers for connectivity-level failures.
const NETWORK_MARKERS: &[&str] = &["network", "connection", "connect", "timeout", "unavailable", "reset"];

/// Classify an error message from the generation service by its markers.
///
/// The wire format is vendor-defined and opaque; classification inspects
/// the message text the way the service actually reports limits.
pub fn classify_markers(message: &str) -> FailureKind {
    let lower = message.to_lowercase();

    if QUOTA_MARKERS.iter().any(|m| lower.contains(m)) {
        return FailureKind::QuotaExceeded;
    }

    if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
        return FailureKind::TransientNetwork;
    }

    FailureKind::Permanent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_markers() {
        assert_eq!(
            classify_markers("429 RESOURCE_EXHAUSTED: Quota exceeded for metric"),
            FailureKind::QuotaExceeded
        );
        assert_eq!(
            classify_markers("You have exceeded your current billing plan"),
            FailureKind::QuotaExceeded
        );
    }

    #[test]
    fn test_network_markers() {
        assert_eq!(
            classify_markers("connection reset by peer"),
            FailureKind::TransientNetwork
        );
        assert_eq!(
            classify_markers("Service temporarily unavailable"),
            FailureKind::TransientNetwork
        );
    }

    #[test]
    fn test_unknown_is_permanent() {
        assert_eq!(
            classify_markers("prompt violates content policy"),
            FailureKind::Permanent
        );
    }

    #[test]
    fn test_retryability() {
        assert!(FailureKind::TransientNetwork.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
        assert!(FailureKind::QuotaExceeded.is_retryable());
        assert!(!FailureKind::InvalidInput.is_retryable());
        assert!(!FailureKind::Permanent.is_retryable());
        assert!(!FailureKind::SkippedQuota.is_retryable());
    }

    #[test]
    fn test_only_quota_escalates() {
        assert!(FailureKind::QuotaExceeded.escalates_quota());
        assert!(!FailureKind::TransientNetwork.escalates_quota());
        assert!(!FailureKind::Timeout.escalates_quota());
    }
}
