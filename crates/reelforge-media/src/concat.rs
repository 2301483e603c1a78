//! Concat-demuxer list files and fade filter construction.

use std::path::Path;

use reelforge_models::encoding::FADE_DURATION_SECS;

use crate::error::MediaResult;

/// Write a concat-demuxer list file referencing the given clips.
///
/// Paths are absolutized and single quotes escaped the way the demuxer
/// expects (`'` becomes `'\''`).
pub async fn write_concat_list(
    clips: &[impl AsRef<Path>],
    list_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let mut contents = String::new();
    for clip in clips {
        let abs = std::fs::canonicalize(clip.as_ref())?;
        let escaped = abs.to_string_lossy().replace('\'', "'\\''");
        contents.push_str(&format!("file '{}'\n", escaped));
    }
    tokio::fs::write(list_path.as_ref(), contents).await?;
    Ok(())
}

/// Build the fade filter chain for an assembled timeline.
///
/// Fades the first half second in and the last half second out. The
/// fade-out is anchored to the final duration of the timeline, so the
/// caller passes the post-trim duration.
pub fn build_fade_filter(final_duration: f64) -> String {
    let fade_out_start = (final_duration - FADE_DURATION_SECS).max(0.0);
    format!(
        "fade=t=in:st=0:d={fade},fade=t=out:st={start:.3}:d={fade}",
        fade = FADE_DURATION_SECS,
        start = fade_out_start,
    )
}

/// Combine the fade chain with an optional rendition scale filter.
pub fn build_rendition_filter(final_duration: f64, scale: Option<&str>) -> String {
    let fades = build_fade_filter(final_duration);
    match scale {
        Some(scale) => format!("{},{}", fades, scale),
        None => fades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fade_filter_anchors_to_duration() {
        let filter = build_fade_filter(10.0);
        assert!(filter.contains("fade=t=in:st=0"));
        assert!(filter.contains("fade=t=out:st=9.500"));
    }

    #[test]
    fn test_fade_filter_short_timeline() {
        // A timeline shorter than the fade still gets a non-negative start.
        let filter = build_fade_filter(0.2);
        assert!(filter.contains("fade=t=out:st=0.000"));
    }

    #[test]
    fn test_rendition_filter_appends_scale() {
        let filter = build_rendition_filter(10.0, Some("scale=-2:720"));
        assert!(filter.ends_with(",scale=-2:720"));

        let plain = build_rendition_filter(10.0, None);
        assert!(!plain.contains("scale"));
    }

    #[tokio::test]
    async fn test_write_concat_list() {
        let dir = TempDir::new().unwrap();
        let clip_a = dir.path().join("shot_001.mp4");
        let clip_b = dir.path().join("shot_002.mp4");
        std::fs::write(&clip_a, b"a").unwrap();
        std::fs::write(&clip_b, b"b").unwrap();

        let list = dir.path().join("list.txt");
        write_concat_list(&[&clip_a, &clip_b], &list).await.unwrap();

        let contents = std::fs::read_to_string(&list).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("file '"));
        assert!(lines[0].contains("shot_001.mp4"));
        assert!(lines[1].contains("shot_002.mp4"));
    }

    #[tokio::test]
    async fn test_write_concat_list_escapes_quotes() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("it's a clip.mp4");
        std::fs::write(&clip, b"x").unwrap();

        let list = dir.path().join("list.txt");
        write_concat_list(&[&clip], &list).await.unwrap();

        let contents = std::fs::read_to_string(&list).unwrap();
        assert!(contents.contains("it'\\''s a clip.mp4"));
    }
}
