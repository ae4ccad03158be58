// Quality tag -> engine format-selector translation

use super::models::MediaKind;

/// Unrestricted best video paired with best audio.
const BEST_VIDEO: &str = "bestvideo+bestaudio/best";

/// Best available audio stream.
const BEST_AUDIO: &str = "bestaudio/best";

/// Selector for a video quality tag. Unrecognized tags degrade to the
/// unrestricted selector rather than failing.
pub fn video_selector(quality: &str) -> &'static str {
    match quality.to_ascii_lowercase().as_str() {
        "best" => BEST_VIDEO,
        "2160p" => "bestvideo[height<=2160]+bestaudio/best",
        "1440p" => "bestvideo[height<=1440]+bestaudio/best",
        "1080p" => "bestvideo[height<=1080]+bestaudio/best",
        "720p" => "bestvideo[height<=720]+bestaudio/best",
        "480p" => "bestvideo[height<=480]+bestaudio/best",
        "360p" => "bestvideo[height<=360]+bestaudio/best",
        _ => BEST_VIDEO,
    }
}

/// Selector expression for one request.
///
/// Audio requests ignore the quality tag here entirely; it flows to the
/// extract-audio postprocessor as a bitrate instead. An explicit audio
/// track on a video request appends a language-equality constraint.
pub fn format_selector(kind: MediaKind, quality: &str, audio_track: &str) -> String {
    match kind {
        MediaKind::Audio => BEST_AUDIO.to_string(),
        MediaKind::Video => {
            let mut selector = video_selector(quality).to_string();
            if audio_track != "auto" {
                selector.push_str(&format!("[language={audio_track}]"));
            }
            selector
        }
    }
}
