//! Shot prompts and the script input document.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single shot prompt produced by the upstream script stage.
///
/// Shot indices are 1-based and define the output ordering; the manifest
/// and the assembled video both follow them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShotPrompt {
    /// 1-based shot index
    pub shot_index: u32,

    /// Free-text generation instruction
    pub text: String,

    /// Target clip duration in seconds
    pub duration_seconds: f64,

    /// Reference image identifiers for visual consistency
    #[serde(default)]
    pub reference_image_ids: Vec<String>,
}

impl ShotPrompt {
    /// Create a prompt without reference images.
    pub fn new(shot_index: u32, text: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            shot_index,
            text: text.into(),
            duration_seconds,
            reference_image_ids: Vec::new(),
        }
    }

    /// Attach reference image identifiers.
    pub fn with_reference_images(mut self, ids: Vec<String>) -> Self {
        self.reference_image_ids = ids;
        self
    }
}

/// The script document handed over by the script stage.
///
/// Persisted upstream as JSON; the pipeline binary deserializes it and
/// passes the typed values down.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScriptFile {
    /// Video title, used for output file naming after sanitization
    pub title: String,

    /// Target duration of the assembled video in seconds
    pub target_duration_seconds: f64,

    /// Ordered shot prompts
    pub shots: Vec<ShotPrompt>,
}

impl ScriptFile {
    /// Sum of the per-shot target durations.
    pub fn planned_duration(&self) -> f64 {
        self.shots.iter().map(|s| s.duration_seconds).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_file_roundtrip() {
        let json = r#"{
            "title": "A Day at Sea",
            "target_duration_seconds": 20.0,
            "shots": [
                {"shot_index": 1, "text": "a fishing boat leaves the harbor at dawn", "duration_seconds": 5.0},
                {"shot_index": 2, "text": "waves crash against the bow", "duration_seconds": 5.0, "reference_image_ids": ["char_01"]}
            ]
        }"#;

        let script: ScriptFile = serde_json::from_str(json).unwrap();
        assert_eq!(script.shots.len(), 2);
        assert_eq!(script.shots[0].shot_index, 1);
        assert!(script.shots[0].reference_image_ids.is_empty());
        assert_eq!(script.shots[1].reference_image_ids, vec!["char_01"]);
        assert!((script.planned_duration() - 10.0).abs() < f64::EPSILON);
    }
}
