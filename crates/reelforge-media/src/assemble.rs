//! The assembly engine: stitch surviving clips into delivery renditions.
//!
//! Takes the clip manifest produced by the scheduler, validates the
//! backing files, concatenates them in shot order with fade transitions,
//! and renders each rendition as an independent encode pass. A rendition
//! whose filtered pass fails is retried with a plain concat pass; if that
//! also fails the rendition is omitted. Only a total absence of valid
//! clips is fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use reelforge_models::encoding::{DURATION_TOLERANCE_SECS, MIN_CLIP_BYTES};
use reelforge_models::{
    sanitize_title, AssemblyMetadata, AssemblyResult, ClipManifest, ClipManifestEntry,
    EncodingConfig, Rendition,
};

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::concat::{build_rendition_filter, write_concat_list};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;
use crate::thumbnail::extract_thumbnail;

/// Wall-clock ceiling for one rendition encode pass (seconds).
const ENCODE_TIMEOUT_SECS: u64 = 600;

/// Options for one assembly run.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Directory the renditions and thumbnail are written to
    pub output_dir: PathBuf,
    /// Video title (sanitized into the output file stem)
    pub title: String,
    /// Target duration of the assembled video in seconds
    pub target_duration_seconds: f64,
    /// Encode parameters shared by all rendition passes
    pub encoding: EncodingConfig,
}

/// A manifest entry that survived file validation.
#[derive(Debug, Clone)]
struct ValidClip {
    shot_index: u32,
    path: PathBuf,
    /// Duration recorded in the manifest, used when probing fails
    manifest_duration: f64,
}

/// Assemble the manifest's surviving clips into renditions and a thumbnail.
///
/// Fails with [`MediaError::NoValidClips`] when no manifest entry is
/// completed with an existing, non-trivially-sized backing file. All other
/// failures degrade: renditions are omitted individually and a failed
/// thumbnail extraction leaves `thumbnail` unset.
pub async fn assemble(
    manifest: &ClipManifest,
    opts: &AssemblyOptions,
) -> MediaResult<AssemblyResult> {
    let clips = validate_clips(&manifest.entries);
    if clips.is_empty() {
        return Err(MediaError::NoValidClips);
    }

    check_ffmpeg()?;
    tokio::fs::create_dir_all(&opts.output_dir).await?;

    // Probe actual durations; fall back to the manifest's recorded value.
    let mut total_duration = 0.0;
    for clip in &clips {
        let duration = match probe_video(&clip.path).await {
            Ok(info) => info.duration,
            Err(e) => {
                warn!(
                    "Probe failed for {} ({}), using manifest duration",
                    clip.path.display(),
                    e
                );
                clip.manifest_duration
            }
        };
        total_duration += duration;
    }

    // Trim only when the timeline overshoots the target beyond tolerance.
    let trim = total_duration > opts.target_duration_seconds + DURATION_TOLERANCE_SECS;
    let final_duration = if trim {
        opts.target_duration_seconds
    } else {
        total_duration
    };

    info!(
        "Assembling {} clips ({:.1}s timeline, target {:.1}s{})",
        clips.len(),
        total_duration,
        opts.target_duration_seconds,
        if trim { ", trimming" } else { "" }
    );

    // Concat list lives in a scratch directory for the run.
    let scratch = tempfile::tempdir()?;
    let list_path = scratch.path().join("concat_list.txt");
    let paths: Vec<&Path> = clips.iter().map(|c| c.path.as_path()).collect();
    write_concat_list(&paths, &list_path).await?;

    let stem = sanitize_title(&opts.title);
    let mut renditions = BTreeMap::new();

    for rendition in Rendition::ALL {
        let out_path = opts
            .output_dir
            .join(format!("{}{}.mp4", stem, rendition.suffix()));

        match render_rendition(
            &list_path,
            &out_path,
            rendition,
            &opts.encoding,
            final_duration,
            trim,
        )
        .await
        {
            Ok(()) => {
                info!("Rendition {} written to {}", rendition, out_path.display());
                renditions.insert(rendition.as_str().to_string(), out_path);
            }
            Err(e) => {
                warn!("Rendition {} failed, omitting: {}", rendition, e);
            }
        }
    }

    // Thumbnail from the best rendition we managed to produce, at the
    // temporal midpoint.
    let thumbnail_path = opts.output_dir.join(format!("{}_thumbnail.jpg", stem));
    let thumbnail_source = renditions
        .get(Rendition::HighQuality.as_str())
        .or_else(|| renditions.values().next());

    let thumbnail = match thumbnail_source {
        Some(source) => {
            match extract_thumbnail(source, &thumbnail_path, final_duration / 2.0).await {
                Ok(()) => Some(thumbnail_path),
                Err(e) => {
                    warn!("Thumbnail extraction failed: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    Ok(AssemblyResult {
        renditions,
        thumbnail,
        metadata: AssemblyMetadata {
            total_clips: manifest.total(),
            successful_clips: clips.len(),
            final_duration_seconds: final_duration,
            target_duration_seconds: opts.target_duration_seconds,
        },
    })
}

/// Filter the manifest to completed entries with a usable backing file and
/// re-sort by shot index.
///
/// The manifest is produced in shot order already; the sort is defensive.
fn validate_clips(entries: &[ClipManifestEntry]) -> Vec<ValidClip> {
    let mut clips: Vec<ValidClip> = entries
        .iter()
        .filter(|e| e.is_completed())
        .filter_map(|e| {
            let path = e.file_path.as_ref()?;
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() >= MIN_CLIP_BYTES => Some(ValidClip {
                    shot_index: e.shot_index,
                    path: path.clone(),
                    manifest_duration: e.duration_seconds,
                }),
                Ok(meta) => {
                    warn!(
                        "Clip for shot {} is too small ({} bytes), skipping: {}",
                        e.shot_index,
                        meta.len(),
                        path.display()
                    );
                    None
                }
                Err(_) => {
                    warn!(
                        "Clip for shot {} does not exist, skipping: {}",
                        e.shot_index,
                        path.display()
                    );
                    None
                }
            }
        })
        .collect();

    clips.sort_by_key(|c| c.shot_index);
    clips
}

/// Render one rendition from the shared concat list.
///
/// The primary pass applies the fade chain (plus the rendition's scale
/// filter); if it fails, a plain concat pass without fades is attempted
/// before giving up on the rendition.
async fn render_rendition(
    list_path: &Path,
    out_path: &Path,
    rendition: Rendition,
    encoding: &EncodingConfig,
    final_duration: f64,
    trim: bool,
) -> MediaResult<()> {
    let filter = build_rendition_filter(final_duration, rendition.scale_filter());

    let primary = concat_command(list_path, out_path, rendition, encoding, trim, final_duration)
        .video_filter(filter);

    let runner = FfmpegRunner::new().with_timeout(ENCODE_TIMEOUT_SECS);

    match runner.run(&primary).await {
        Ok(()) => return Ok(()),
        Err(e) => {
            warn!(
                "Filtered pass for {} failed ({}), retrying without transitions",
                rendition, e
            );
        }
    }

    let mut fallback =
        concat_command(list_path, out_path, rendition, encoding, trim, final_duration);
    if let Some(scale) = rendition.scale_filter() {
        fallback = fallback.video_filter(scale);
    }

    runner.run(&fallback).await
}

/// Shared concat-demuxer encode command for a rendition.
fn concat_command(
    list_path: &Path,
    out_path: &Path,
    rendition: Rendition,
    encoding: &EncodingConfig,
    trim: bool,
    final_duration: f64,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(list_path, out_path)
        .input_args(["-f", "concat", "-safe", "0"])
        .output_args(encoding.to_ffmpeg_args(rendition.video_bitrate()));

    if trim {
        cmd = cmd.duration(final_duration);
    }

    cmd
}
