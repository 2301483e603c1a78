//! Thumbnail extraction.

use std::path::Path;

use reelforge_models::encoding::THUMBNAIL_QUALITY;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Extract a single frame from a video at the given timestamp.
pub async fn extract_thumbnail(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    at_seconds: f64,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path.as_ref())
        .seek(at_seconds)
        .single_frame()
        .frame_quality(THUMBNAIL_QUALITY)
        .log_level("error");

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_command_shape() {
        let cmd = FfmpegCommand::new("video.mp4", "thumb.jpg")
            .seek(5.0)
            .single_frame()
            .frame_quality(THUMBNAIL_QUALITY);

        let args = cmd.build_args();
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"5.000".to_string()));
        assert!(args.contains(&"-vframes".to_string()));
    }
}
