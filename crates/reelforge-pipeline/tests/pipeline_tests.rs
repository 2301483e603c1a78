//! End-to-end pipeline tests.
//!
//! The mock generator synthesizes real clips through ffmpeg, so the
//! full-assembly cases are ignored on machines without a transcoder.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use reelforge_gen::{
    GenError, GenResult, MockGenerator, PollStatus, SubmitTicket, VideoGenerator,
};
use reelforge_models::{ClipStatus, FailureKind, ScriptFile, ShotPrompt};
use reelforge_pipeline::{run_pipeline, PipelineConfig, PipelineError, MANIFEST_FILENAME};

/// Mock-backed generator that permanently fails the listed shots.
struct FlakyGenerator {
    inner: MockGenerator,
    failing_shots: Vec<u32>,
}

impl FlakyGenerator {
    fn new(failing_shots: Vec<u32>) -> Self {
        Self {
            inner: MockGenerator::new().unwrap(),
            failing_shots,
        }
    }
}

#[async_trait]
impl VideoGenerator for FlakyGenerator {
    async fn submit(&self, prompt: &ShotPrompt) -> GenResult<SubmitTicket> {
        if self.failing_shots.contains(&prompt.shot_index) {
            return Err(GenError::Service {
                status: 400,
                message: "request rejected by content filters".to_string(),
            });
        }
        self.inner.submit(prompt).await
    }

    async fn poll(&self, operation: &str) -> GenResult<PollStatus> {
        self.inner.poll(operation).await
    }

    async fn fetch(&self, artifact_uri: &str, dest: &Path) -> GenResult<()> {
        self.inner.fetch(artifact_uri, dest).await
    }
}

fn script(shots: u32, per_shot_secs: f64) -> ScriptFile {
    ScriptFile {
        title: "Harbor Story".to_string(),
        target_duration_seconds: shots as f64 * per_shot_secs,
        shots: (1..=shots)
            .map(|i| {
                ShotPrompt::new(
                    i,
                    format!("shot {}: the harbor at a different time of day", i),
                    per_shot_secs,
                )
            })
            .collect(),
    }
}

fn fast_config(output_root: &Path) -> PipelineConfig {
    PipelineConfig {
        retry_base_delay: Duration::from_millis(1),
        retry_max_delay: Duration::from_millis(2),
        success_cooldown: Duration::ZERO,
        output_root: output_root.to_path_buf(),
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn test_all_shots_failing_is_fatal_but_manifest_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());

    let generator = FlakyGenerator::new(vec![1, 2, 3]);
    let result = run_pipeline(generator, &script(3, 5.0), &config).await;

    match result {
        Err(PipelineError::Media(reelforge_media::MediaError::NoValidClips)) => {}
        other => panic!("expected NoValidClips, got {:?}", other.map(|_| ())),
    }

    // The manifest survives the fatal-empty run for inspection.
    let manifest =
        reelforge_models::ClipManifest::load(dir.path().join(MANIFEST_FILENAME)).unwrap();
    assert_eq!(manifest.total(), 3);
    assert_eq!(manifest.succeeded(), 0);
    assert!(manifest
        .entries
        .iter()
        .all(|e| e.failure == Some(FailureKind::Permanent)));
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_mock_pipeline_produces_all_renditions() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());

    let generator = MockGenerator::new().unwrap();
    let report = run_pipeline(generator, &script(3, 2.0), &config)
        .await
        .unwrap();

    assert_eq!(report.generation.successful_shots, 3);
    assert_eq!(report.assembly.rendition_count(), 3);
    assert!(report.assembly.thumbnail.is_some());

    for path in report.assembly.renditions.values() {
        assert!(path.exists(), "missing rendition {}", path.display());
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_assembly_duration_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());

    let generator = MockGenerator::new().unwrap();
    run_pipeline(generator, &script(2, 2.0), &config)
        .await
        .unwrap();

    let manifest =
        reelforge_models::ClipManifest::load(dir.path().join(MANIFEST_FILENAME)).unwrap();

    let assemble_into = |subdir: &str| reelforge_media::AssemblyOptions {
        output_dir: dir.path().join(subdir),
        title: "Harbor Story".to_string(),
        target_duration_seconds: 4.0,
        encoding: reelforge_models::EncodingConfig::default(),
    };

    let first = reelforge_media::assemble(&manifest, &assemble_into("pass1"))
        .await
        .unwrap();
    let second = reelforge_media::assemble(&manifest, &assemble_into("pass2"))
        .await
        .unwrap();

    let delta = (first.metadata.final_duration_seconds - second.metadata.final_duration_seconds)
        .abs();
    assert!(delta < 0.1, "duration drifted by {:.3}s between runs", delta);
    assert_eq!(first.rendition_count(), second.rendition_count());
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_partial_failure_example_scenario() {
    // Four 5s shots toward a 20s target; shots 2 and 4 fail permanently.
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());

    let generator = FlakyGenerator::new(vec![2, 4]);
    let report = run_pipeline(generator, &script(4, 5.0), &config)
        .await
        .unwrap();

    let manifest =
        reelforge_models::ClipManifest::load(dir.path().join(MANIFEST_FILENAME)).unwrap();
    let statuses: Vec<ClipStatus> = manifest.entries.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            ClipStatus::Completed,
            ClipStatus::Failed,
            ClipStatus::Completed,
            ClipStatus::Failed
        ]
    );

    assert_eq!(report.assembly.metadata.total_clips, 4);
    assert_eq!(report.assembly.metadata.successful_clips, 2);

    // Shots 1 and 3 survive: roughly a ten second timeline.
    let final_duration = report.assembly.metadata.final_duration_seconds;
    assert!(
        (8.5..=11.5).contains(&final_duration),
        "unexpected final duration {:.2}s",
        final_duration
    );
    assert_eq!(report.assembly.rendition_count(), 3);
}
