//! Job runner: drives one prompt through the generation service.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use reelforge_models::{FailureKind, GenerationJob, ShotPrompt};

use crate::client::{PollStatus, SubmitTicket, VideoGenerator};
use crate::error::{GenError, GenResult};
use crate::retry::RetryPolicy;

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default wall-clock ceiling for one generation attempt.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Shortest accepted prompt after trimming.
const MIN_PROMPT_CHARS: usize = 10;

/// Clip duration bounds accepted by the service (seconds).
const MIN_DURATION_SECS: f64 = 1.0;
const MAX_DURATION_SECS: f64 = 60.0;

/// Keywords rejected before the service is ever called.
const DISALLOWED_KEYWORDS: &[&str] = &["violence", "gore", "explicit", "nsfw"];

/// Runs one prompt to a terminal [`GenerationJob`].
///
/// All failure is represented in the returned job; `run` never errors.
pub struct JobRunner<G> {
    generator: G,
    policy: RetryPolicy,
    poll_interval: Duration,
    poll_timeout: Duration,
    output_dir: PathBuf,
}

impl<G: VideoGenerator> JobRunner<G> {
    pub fn new(generator: G, policy: RetryPolicy, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            policy,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Drive `prompt` until the job is Completed or Failed.
    pub async fn run(&self, prompt: &ShotPrompt) -> GenerationJob {
        let mut job = GenerationJob::new(prompt.shot_index);

        // Invalid prompts terminate immediately and count as their one
        // attempt; the service is never called.
        if let Err(reason) = validate_prompt(prompt) {
            warn!(shot = prompt.shot_index, "Prompt rejected: {}", reason);
            job.attempts = 1;
            job.fail(FailureKind::InvalidInput, reason);
            return job;
        }

        loop {
            job.begin_attempt();
            debug!(
                shot = prompt.shot_index,
                attempt = job.attempts,
                "Starting generation attempt"
            );

            match self.attempt(prompt, &mut job).await {
                Ok(path) => {
                    info!(
                        shot = prompt.shot_index,
                        attempts = job.attempts,
                        "Clip ready at {}",
                        path.display()
                    );
                    job.complete(path);
                    return job;
                }
                Err(e) => {
                    let kind = e.classification();
                    if self.policy.should_retry(kind, job.attempts) {
                        let delay = self.policy.delay_for_attempt(job.attempts - 1);
                        warn!(
                            shot = prompt.shot_index,
                            attempt = job.attempts,
                            classification = %kind,
                            "Attempt failed ({}), retrying in {:.1}s",
                            e,
                            delay.as_secs_f64()
                        );
                        job.reset_for_retry(kind, e.to_string());
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            shot = prompt.shot_index,
                            attempts = job.attempts,
                            classification = %kind,
                            "Job failed: {}",
                            e
                        );
                        job.fail(kind, e.to_string());
                        return job;
                    }
                }
            }
        }
    }

    /// One submit/poll/fetch cycle.
    async fn attempt(&self, prompt: &ShotPrompt, job: &mut GenerationJob) -> GenResult<PathBuf> {
        let artifact_uri = match self.generator.submit(prompt).await? {
            SubmitTicket::Artifact(uri) => uri,
            SubmitTicket::Operation(operation) => {
                job.polling(operation.clone());
                self.await_operation(&operation).await?
            }
        };

        let dest = self.output_dir.join(clip_filename(prompt.shot_index));
        tokio::fs::create_dir_all(&self.output_dir).await?;
        self.generator.fetch(&artifact_uri, &dest).await?;

        // Completed implies a real file on disk.
        let meta = tokio::fs::metadata(&dest).await?;
        if meta.len() == 0 {
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(GenError::MissingArtifact);
        }

        Ok(dest)
    }

    /// Poll an operation until it resolves or the wall clock runs out.
    async fn await_operation(&self, operation: &str) -> GenResult<String> {
        let deadline = Instant::now() + self.poll_timeout;

        loop {
            match self.generator.poll(operation).await? {
                PollStatus::Complete { artifact_uri } => return Ok(artifact_uri),
                PollStatus::Failed { message } => return Err(GenError::OperationFailed(message)),
                PollStatus::InProgress => {
                    if Instant::now() >= deadline {
                        return Err(GenError::PollTimeout(self.poll_timeout.as_secs()));
                    }
                    debug!(operation, "Generation in progress, re-polling");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

/// Deterministic clip filename for a shot.
pub fn clip_filename(shot_index: u32) -> String {
    format!("shot_{:03}.mp4", shot_index)
}

/// Validate a prompt locally before submission.
fn validate_prompt(prompt: &ShotPrompt) -> Result<(), String> {
    if prompt.text.trim().len() < MIN_PROMPT_CHARS {
        return Err(format!(
            "prompt text too short (minimum {} characters)",
            MIN_PROMPT_CHARS
        ));
    }

    if prompt.duration_seconds < MIN_DURATION_SECS || prompt.duration_seconds > MAX_DURATION_SECS {
        return Err(format!(
            "duration {:.1}s outside [{:.0}, {:.0}] seconds",
            prompt.duration_seconds, MIN_DURATION_SECS, MAX_DURATION_SECS
        ));
    }

    let lower = prompt.text.to_lowercase();
    for keyword in DISALLOWED_KEYWORDS {
        if lower.contains(keyword) {
            return Err(format!("prompt contains disallowed keyword '{}'", keyword));
        }
    }

    Ok(())
}
