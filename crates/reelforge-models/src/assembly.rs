//! Renditions and the assembly result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One encoded output variant of the assembled video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rendition {
    /// High-bitrate delivery master
    HighQuality,
    /// Reduced bitrate for web playback
    Web,
    /// Downscaled to 720p vertical resolution for mobile
    Mobile,
}

impl Rendition {
    /// All renditions produced by an assembly run.
    pub const ALL: [Rendition; 3] = [Rendition::HighQuality, Rendition::Web, Rendition::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rendition::HighQuality => "high_quality",
            Rendition::Web => "web",
            Rendition::Mobile => "mobile",
        }
    }

    /// Output filename suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Rendition::HighQuality => "_HQ",
            Rendition::Web => "_Web",
            Rendition::Mobile => "_Mobile",
        }
    }

    /// Target video bitrate for the encode pass.
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            Rendition::HighQuality => "5000k",
            Rendition::Web => "2000k",
            Rendition::Mobile => "1000k",
        }
    }

    /// Scale filter applied on top of the shared timeline, if any.
    pub fn scale_filter(&self) -> Option<&'static str> {
        match self {
            Rendition::Mobile => Some("scale=-2:720"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rendition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata describing one assembly run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssemblyMetadata {
    /// Number of manifest entries considered
    pub total_clips: usize,
    /// Number of clips that survived validation and were stitched
    pub successful_clips: usize,
    /// Duration of the assembled timeline in seconds
    pub final_duration_seconds: f64,
    /// Requested target duration in seconds
    pub target_duration_seconds: f64,
}

/// Outcome of one assembly run: whichever renditions succeeded, the
/// thumbnail, and run metadata. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssemblyResult {
    /// Rendition name -> output file path (only successful renditions)
    pub renditions: BTreeMap<String, PathBuf>,

    /// Extracted thumbnail path (absent if extraction failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,

    /// Run metadata
    pub metadata: AssemblyMetadata,
}

impl AssemblyResult {
    /// Path of a rendition, if it was produced.
    pub fn rendition(&self, rendition: Rendition) -> Option<&PathBuf> {
        self.renditions.get(rendition.as_str())
    }

    pub fn rendition_count(&self) -> usize {
        self.renditions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendition_parameters() {
        assert_eq!(Rendition::HighQuality.video_bitrate(), "5000k");
        assert_eq!(Rendition::Web.video_bitrate(), "2000k");
        assert_eq!(Rendition::Mobile.video_bitrate(), "1000k");
        assert!(Rendition::Mobile.scale_filter().is_some());
        assert!(Rendition::HighQuality.scale_filter().is_none());
    }

    #[test]
    fn test_rendition_lookup() {
        let mut renditions = BTreeMap::new();
        renditions.insert(
            Rendition::Web.as_str().to_string(),
            PathBuf::from("/out/title_Web.mp4"),
        );

        let result = AssemblyResult {
            renditions,
            thumbnail: None,
            metadata: AssemblyMetadata {
                total_clips: 4,
                successful_clips: 2,
                final_duration_seconds: 10.0,
                target_duration_seconds: 20.0,
            },
        };

        assert!(result.rendition(Rendition::Web).is_some());
        assert!(result.rendition(Rendition::Mobile).is_none());
        assert_eq!(result.rendition_count(), 1);
    }
}
