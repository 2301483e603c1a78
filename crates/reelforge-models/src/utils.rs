//! Shared string utilities.

/// Fallback base name when a title sanitizes to nothing.
const FALLBACK_TITLE: &str = "generated_video";

/// Sanitize a video title into a safe output file stem.
///
/// Keeps alphanumerics, spaces, hyphens, and underscores; everything else
/// is dropped. Trailing whitespace is stripped. An empty result falls
/// back to `generated_video`.
pub fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    let safe = safe.trim_end().to_string();

    if safe.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        safe
    }
}
