//! Mock generator for offline runs.
//!
//! Selected only by configuration (`GEN_MOCK_MODE`); production failure
//! handling never swaps in mock artifacts. Clips are synthesized as
//! solid-color videos through ffmpeg's lavfi source, with a minimal MP4
//! byte stub when no transcoder is installed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use reelforge_media::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use reelforge_models::ShotPrompt;

use crate::client::{PollStatus, SubmitTicket, VideoGenerator};
use crate::error::{GenError, GenResult};

/// Minimal MP4 ftyp box, used when ffmpeg is unavailable.
const MP4_STUB_HEADER: [u8; 32] = [
    0x00, 0x00, 0x00, 0x20, 0x66, 0x74, 0x79, 0x70, 0x69, 0x73, 0x6F, 0x6D, 0x00, 0x00, 0x02,
    0x00, 0x69, 0x73, 0x6F, 0x6D, 0x69, 0x73, 0x6F, 0x32, 0x61, 0x76, 0x63, 0x31, 0x6D, 0x70,
    0x34, 0x31,
];

/// Padding appended to the stub so it clears the assembly size floor.
const MP4_STUB_PADDING: usize = 2048;

/// Generator that synthesizes placeholder clips locally.
pub struct MockGenerator {
    scratch: tempfile::TempDir,
}

impl MockGenerator {
    pub fn new() -> GenResult<Self> {
        Ok(Self {
            scratch: tempfile::tempdir()?,
        })
    }

    fn clip_path(&self, shot_index: u32) -> PathBuf {
        self.scratch
            .path()
            .join(format!("mock_shot_{:03}.mp4", shot_index))
    }

    /// Render a solid-color clip of the requested duration.
    async fn synthesize(&self, prompt: &ShotPrompt, dest: &Path) -> GenResult<()> {
        if check_ffmpeg().is_ok() {
            let source = format!(
                "color=c=blue:size=640x480:duration={:.3}",
                prompt.duration_seconds
            );
            let cmd = FfmpegCommand::new(&source, dest)
                .input_args(["-f", "lavfi"])
                .output_args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);

            match FfmpegRunner::new().run(&cmd).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!("lavfi synthesis failed ({}), writing byte stub", e),
            }
        }

        let mut bytes = MP4_STUB_HEADER.to_vec();
        bytes.extend(std::iter::repeat(0u8).take(MP4_STUB_PADDING));
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl VideoGenerator for MockGenerator {
    async fn submit(&self, prompt: &ShotPrompt) -> GenResult<SubmitTicket> {
        let dest = self.clip_path(prompt.shot_index);
        debug!(shot = prompt.shot_index, "Synthesizing mock clip");
        self.synthesize(prompt, &dest).await?;
        Ok(SubmitTicket::Artifact(dest.to_string_lossy().to_string()))
    }

    async fn poll(&self, _operation: &str) -> GenResult<PollStatus> {
        // Mock submission is synchronous; nothing ever polls.
        Err(GenError::OperationFailed(
            "mock generator has no asynchronous operations".to_string(),
        ))
    }

    async fn fetch(&self, artifact_uri: &str, dest: &Path) -> GenResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(Path::new(artifact_uri), dest).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_produces_nontrivial_artifact() {
        let generator = MockGenerator::new().unwrap();
        let prompt = ShotPrompt::new(1, "a quiet meadow under morning light", 2.0);

        let ticket = generator.submit(&prompt).await.unwrap();
        let uri = match ticket {
            SubmitTicket::Artifact(uri) => uri,
            other => panic!("unexpected ticket: {:?}", other),
        };

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("shot_001.mp4");
        generator.fetch(&uri, &dest).await.unwrap();

        let size = std::fs::metadata(&dest).unwrap().len();
        assert!(size >= 1024, "mock clip too small: {} bytes", size);
    }
}
