//! Generation service client.
//!
//! The [`VideoGenerator`] trait is the pipeline's boundary to the
//! text-to-video vendor: a submit call, a poll call for asynchronous
//! operations, and an artifact fetch. [`VeoClient`] implements it against
//! the Generative Language long-running operations API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use reelforge_models::ShotPrompt;

use crate::error::{GenError, GenResult};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-preview";

/// Negative prompt applied to every request.
const NEGATIVE_PROMPT: &str = "cartoon, drawing, low quality, blurry, distorted";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "VIDEO_GEN_API_KEY";

/// Outcome of a submit call.
#[derive(Debug, Clone)]
pub enum SubmitTicket {
    /// The service returned an asynchronous operation handle to poll.
    Operation(String),
    /// The service produced the artifact synchronously.
    Artifact(String),
}

/// Status of an asynchronous generation operation.
#[derive(Debug, Clone)]
pub enum PollStatus {
    /// Still generating; poll again later.
    InProgress,
    /// Generation finished; the artifact can be fetched.
    Complete { artifact_uri: String },
    /// The service reported a terminal failure.
    Failed { message: String },
}

/// Boundary to the external text-to-video service.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Submit one shot prompt for generation.
    async fn submit(&self, prompt: &ShotPrompt) -> GenResult<SubmitTicket>;

    /// Poll an asynchronous operation returned by [`submit`](Self::submit).
    async fn poll(&self, operation: &str) -> GenResult<PollStatus>;

    /// Download a finished artifact to `dest`.
    async fn fetch(&self, artifact_uri: &str, dest: &Path) -> GenResult<()>;
}

/// Client for the Veo long-running generation API.
pub struct VeoClient {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateVideoRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct Parameters {
    #[serde(rename = "durationSeconds")]
    duration_seconds: u32,
    #[serde(rename = "negativePrompt")]
    negative_prompt: String,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(rename = "generateVideoResponse")]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    #[serde(rename = "generatedSamples", default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

impl VeoClient {
    /// Create a client with the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Create a client from the environment.
    pub fn from_env() -> GenResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| GenError::config(format!("{} not set", API_KEY_ENV)))?;
        Ok(Self::new(api_key))
    }

    /// Override the API endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build the submission prompt, hinting at reference images when the
    /// shot carries them.
    fn build_prompt(prompt: &ShotPrompt) -> String {
        if prompt.reference_image_ids.is_empty() {
            prompt.text.clone()
        } else {
            format!(
                "{} (maintain visual consistency with reference images: {})",
                prompt.text,
                prompt.reference_image_ids.join(", ")
            )
        }
    }

    async fn error_from_response(response: reqwest::Response) -> GenError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        GenError::Service { status, message }
    }
}

#[async_trait]
impl VideoGenerator for VeoClient {
    async fn submit(&self, prompt: &ShotPrompt) -> GenResult<SubmitTicket> {
        let url = format!("{}/models/{}:predictLongRunning", self.base_url, self.model);

        let request = GenerateVideoRequest {
            instances: vec![Instance {
                prompt: Self::build_prompt(prompt),
            }],
            parameters: Parameters {
                duration_seconds: prompt.duration_seconds.round() as u32,
                negative_prompt: NEGATIVE_PROMPT.to_string(),
                aspect_ratio: "16:9".to_string(),
            },
        };

        debug!(shot = prompt.shot_index, "Submitting generation request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let handle: OperationHandle = response.json().await?;
        info!(
            shot = prompt.shot_index,
            operation = %handle.name,
            "Generation operation accepted"
        );

        Ok(SubmitTicket::Operation(handle.name))
    }

    async fn poll(&self, operation: &str) -> GenResult<PollStatus> {
        let url = format!("{}/{}", self.base_url, operation);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let status: OperationStatus = response.json().await?;

        if let Some(error) = status.error {
            return Ok(PollStatus::Failed {
                message: error.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        if !status.done {
            return Ok(PollStatus::InProgress);
        }

        let uri = status
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        match uri {
            Some(artifact_uri) => Ok(PollStatus::Complete { artifact_uri }),
            None => Err(GenError::MissingArtifact),
        }
    }

    async fn fetch(&self, artifact_uri: &str, dest: &Path) -> GenResult<()> {
        debug!("Downloading artifact from {}", artifact_uri);

        let response = self
            .client
            .get(artifact_uri)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GenError::MissingArtifact);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;

        info!("Artifact saved to {}", dest.display());
        Ok(())
    }
}
