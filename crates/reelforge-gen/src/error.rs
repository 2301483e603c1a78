//! Error types for clip generation.

use thiserror::Error;

use reelforge_models::{classify_markers, FailureKind};

pub type GenResult<T> = Result<T, GenError>;

/// Errors that can occur while driving the generation service.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt rejected: {0}")]
    InvalidPrompt(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Generation operation failed: {0}")]
    OperationFailed(String),

    #[error("Poll loop exceeded {0} seconds")]
    PollTimeout(u64),

    #[error("Completed operation carried no artifact")]
    MissingArtifact,

    #[error("Media error: {0}")]
    Media(#[from] reelforge_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error for the retry policy and the quota tracker.
    pub fn classification(&self) -> FailureKind {
        match self {
            GenError::InvalidPrompt(_) => FailureKind::InvalidInput,
            GenError::Config(_) => FailureKind::Permanent,
            GenError::PollTimeout(_) => FailureKind::Timeout,
            GenError::Http(e) => {
                if e.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::TransientNetwork
                }
            }
            GenError::Service { status, message } => match status {
                429 => FailureKind::QuotaExceeded,
                s if *s >= 500 => FailureKind::TransientNetwork,
                _ => classify_markers(message),
            },
            GenError::OperationFailed(message) => classify_markers(message),
            // A downloaded-but-empty or vanished artifact is worth another try.
            GenError::MissingArtifact => FailureKind::TransientNetwork,
            GenError::Media(_) | GenError::Io(_) => FailureKind::TransientNetwork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_prompt_classification() {
        let err = GenError::InvalidPrompt("too short".into());
        assert_eq!(err.classification(), FailureKind::InvalidInput);
    }

    #[test]
    fn test_service_status_classification() {
        let quota = GenError::Service {
            status: 429,
            message: String::new(),
        };
        assert_eq!(quota.classification(), FailureKind::QuotaExceeded);

        let server = GenError::Service {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(server.classification(), FailureKind::TransientNetwork);

        let rejected = GenError::Service {
            status: 400,
            message: "unsafe prompt".into(),
        };
        assert_eq!(rejected.classification(), FailureKind::Permanent);
    }

    #[test]
    fn test_operation_message_markers() {
        let quota = GenError::OperationFailed("RESOURCE_EXHAUSTED: quota hit".into());
        assert_eq!(quota.classification(), FailureKind::QuotaExceeded);

        let policy = GenError::OperationFailed("output blocked by safety filters".into());
        assert_eq!(policy.classification(), FailureKind::Permanent);
    }

    #[test]
    fn test_poll_timeout_classification() {
        assert_eq!(
            GenError::PollTimeout(600).classification(),
            FailureKind::Timeout
        );
    }
}
