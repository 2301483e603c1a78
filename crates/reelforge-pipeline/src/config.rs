//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum attempts per generation job (initial attempt included)
    pub max_retries: u32,
    /// Base delay for retry backoff
    pub retry_base_delay: Duration,
    /// Cap on the retry backoff delay
    pub retry_max_delay: Duration,
    /// Interval between status polls
    pub poll_interval: Duration,
    /// Wall-clock ceiling for one generation attempt
    pub poll_timeout: Duration,
    /// Consecutive quota failures before submissions are suspended
    pub quota_failure_threshold: u32,
    /// Cooldown before submissions resume after quota exhaustion
    pub quota_cooldown: Duration,
    /// Pause after each successful job
    pub success_cooldown: Duration,
    /// Root directory for clips, manifest, and renditions
    pub output_root: PathBuf,
    /// Use the mock generator instead of the real service
    pub mock_mode: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_secs(30),
            retry_max_delay: Duration::from_secs(300),
            poll_interval: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(600),
            quota_failure_threshold: 3,
            quota_cooldown: Duration::from_secs(30 * 60),
            success_cooldown: Duration::from_secs(2),
            output_root: PathBuf::from("output"),
            mock_mode: false,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_parse("GEN_MAX_RETRIES", defaults.max_retries),
            retry_base_delay: env_secs("GEN_RETRY_BASE_SECS", defaults.retry_base_delay),
            retry_max_delay: env_secs("GEN_RETRY_MAX_SECS", defaults.retry_max_delay),
            poll_interval: env_secs("GEN_POLL_INTERVAL_SECS", defaults.poll_interval),
            poll_timeout: env_secs("GEN_POLL_TIMEOUT_SECS", defaults.poll_timeout),
            quota_failure_threshold: env_parse(
                "GEN_QUOTA_THRESHOLD",
                defaults.quota_failure_threshold,
            ),
            quota_cooldown: env_secs("GEN_QUOTA_COOLDOWN_SECS", defaults.quota_cooldown),
            success_cooldown: env_secs("GEN_SUCCESS_COOLDOWN_SECS", defaults.success_cooldown),
            output_root: std::env::var("PIPELINE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            mock_mode: std::env::var("GEN_MOCK_MODE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.mock_mode),
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
