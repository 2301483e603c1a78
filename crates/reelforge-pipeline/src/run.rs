//! End-to-end pipeline orchestration.
//!
//! Runs the generation scheduler over the script's shots, persists the
//! clip manifest, hands the manifest to the assembly engine, and persists
//! the assembly outcome. Job failures never abort the run; only a total
//! absence of usable clips surfaces as an error (after the manifest has
//! been written for inspection).

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use reelforge_gen::{
    ClipScheduler, JobRunner, QuotaTracker, RetryPolicy, VideoGenerator,
};
use reelforge_media::{assemble, AssemblyOptions};
use reelforge_models::{
    AssemblyResult, ClipManifest, EncodingConfig, GenerationSummary, Rendition, ScriptFile,
};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// Manifest filename inside the output root.
pub const MANIFEST_FILENAME: &str = "clip_manifest.json";

/// Assembly report filename inside the output root.
pub const REPORT_FILENAME: &str = "assembly_result.json";

/// Persisted record of one pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub title: String,
    pub finished_at: chrono::DateTime<Utc>,
    pub generation: GenerationSummary,
    pub assembly: AssemblyResult,
}

/// Run the full pipeline for one script.
pub async fn run_pipeline<G: VideoGenerator>(
    generator: G,
    script: &ScriptFile,
    config: &PipelineConfig,
) -> PipelineResult<PipelineReport> {
    info!(
        "Starting pipeline for \"{}\" ({} shots, {:.0}s target)",
        script.title,
        script.shots.len(),
        script.target_duration_seconds
    );

    tokio::fs::create_dir_all(&config.output_root).await?;
    let clips_dir = config.output_root.join("clips");
    let final_dir = config.output_root.join("final");

    // Generation
    let policy = RetryPolicy::new(config.max_retries)
        .with_base_delay(config.retry_base_delay)
        .with_max_delay(config.retry_max_delay);

    let runner = JobRunner::new(generator, policy, &clips_dir)
        .with_poll_interval(config.poll_interval)
        .with_poll_timeout(config.poll_timeout);

    let quota = QuotaTracker::new(config.quota_failure_threshold, config.quota_cooldown);

    let mut scheduler =
        ClipScheduler::new(runner, quota).with_success_cooldown(config.success_cooldown);

    let manifest = scheduler.generate_all(&script.shots).await;
    report_shots(&manifest);

    // The manifest is persisted before assembly so a fatal-empty run still
    // leaves the per-shot record behind.
    let manifest_path = config.output_root.join(MANIFEST_FILENAME);
    manifest.save(&manifest_path)?;
    info!("Clip manifest written to {}", manifest_path.display());

    // Assembly
    let options = AssemblyOptions {
        output_dir: final_dir,
        title: script.title.clone(),
        target_duration_seconds: script.target_duration_seconds,
        encoding: EncodingConfig::default(),
    };

    let assembly = assemble(&manifest, &options).await?;
    report_renditions(&assembly);

    let report = PipelineReport {
        title: script.title.clone(),
        finished_at: Utc::now(),
        generation: manifest.summary(),
        assembly,
    };

    let report_path = config.output_root.join(REPORT_FILENAME);
    tokio::fs::write(&report_path, serde_json::to_string_pretty(&report)?).await?;
    info!("Assembly report written to {}", report_path.display());

    Ok(report)
}

/// Log the per-shot outcome table.
fn report_shots(manifest: &ClipManifest) {
    let summary = manifest.summary();
    info!(
        "{} of {} clips succeeded",
        summary.successful_shots, summary.total_shots
    );

    for entry in &manifest.entries {
        match (&entry.failure, &entry.error_message) {
            (Some(kind), Some(message)) => warn!(
                shot = entry.shot_index,
                status = %entry.status,
                classification = %kind,
                "{}",
                message
            ),
            _ => info!(
                shot = entry.shot_index,
                status = %entry.status,
                retries = entry.retry_count,
                "clip ready"
            ),
        }
    }
}

/// Log which renditions were produced.
fn report_renditions(assembly: &AssemblyResult) {
    for rendition in Rendition::ALL {
        match assembly.rendition(rendition) {
            Some(path) => info!(rendition = %rendition, "produced {}", path.display()),
            None => warn!(rendition = %rendition, "not produced"),
        }
    }

    match &assembly.thumbnail {
        Some(path) => info!("thumbnail at {}", path.display()),
        None => warn!("thumbnail extraction failed"),
    }
}

/// Load a script file from disk.
pub fn load_script(path: impl Into<PathBuf>) -> PipelineResult<ScriptFile> {
    let path = path.into();
    let data = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&data)?)
}
