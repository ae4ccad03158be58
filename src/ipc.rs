// JSON wire types for the bridge binary

use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::downloader::{
    AudioTrack, DownloadOptions, MediaKind, ProgressEvent, ProgressSink, VideoInfo,
};

/// Typed event envelope, one JSON object per stdout line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeEvent {
    Error {
        error: String,
        details: Option<String>,
    },
    Progress {
        progress: u8,
        speed: String,
        eta: String,
    },
    Complete {
        filename: String,
    },
}

impl BridgeEvent {
    pub fn progress(event: &ProgressEvent) -> Self {
        Self::Progress {
            progress: event.percent,
            speed: event.speed.clone(),
            eta: event.eta.clone(),
        }
    }
}

/// Progress sink that relays events to the parent process.
pub struct BridgeSink;

impl ProgressSink for BridgeSink {
    fn progress(&mut self, event: &ProgressEvent) {
        emit(&BridgeEvent::progress(event));
    }
}

/// Serialize one value as a JSON line, flushed immediately so the parent
/// sees it live.
pub fn emit_json<T: Serialize>(value: &T) {
    if let Ok(line) = serde_json::to_string(value) {
        println!("{line}");
        let _ = io::stdout().flush();
    }
}

pub fn emit(event: &BridgeEvent) {
    emit_json(event);
}

/// Bare error line for input errors — used before the typed event stream
/// starts, never instead of it.
pub fn emit_bare_error(error: &str, details: Option<&str>) {
    let payload = match details {
        Some(details) => serde_json::json!({ "error": error, "details": details }),
        None => serde_json::json!({ "error": error }),
    };
    println!("{payload}");
    let _ = io::stdout().flush();
}

/// Options accepted by the `download` command. Field names follow the
/// parent process's camelCase convention.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeOptions {
    /// Validated separately so a missing URL gets its own message.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default)]
    pub audio_only: bool,
    #[serde(default = "default_audio_track")]
    pub audio_track: String,
    #[serde(default)]
    pub embed_thumbnail: bool,
    #[serde(default = "default_true")]
    pub embed_metadata: bool,
    #[serde(default = "default_output_folder")]
    pub output_folder: PathBuf,
}

fn default_quality() -> String {
    "best".to_string()
}

fn default_audio_track() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("downloads")
}

impl BridgeOptions {
    /// Resolved engine-facing options; the container defaults by mode.
    pub fn download_options(&self) -> DownloadOptions {
        let media_kind = if self.audio_only {
            MediaKind::Audio
        } else {
            MediaKind::Video
        };
        let container = self.format.clone().unwrap_or_else(|| {
            match media_kind {
                MediaKind::Audio => "mp3",
                MediaKind::Video => "mp4",
            }
            .to_string()
        });
        DownloadOptions {
            media_kind,
            container,
            quality: self.quality.clone(),
            audio_track: self.audio_track.clone(),
            embed_thumbnail: self.embed_thumbnail,
            embed_metadata: self.embed_metadata,
        }
    }
}

/// Successful `get-info` response. The description is capped at 200
/// characters for the parent process; the CLI shows it untruncated.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub title: String,
    pub duration: u64,
    pub thumbnail: Option<String>,
    pub uploader: String,
    pub view_count: u64,
    pub description: String,
    #[serde(rename = "audioTracks")]
    pub audio_tracks: Vec<AudioTrack>,
}

impl InfoResponse {
    pub fn from_info(info: &VideoInfo) -> Self {
        Self {
            success: true,
            title: info.title.clone(),
            duration: info.duration_seconds,
            thumbnail: info.thumbnail.clone(),
            uploader: info.uploader.clone(),
            view_count: info.view_count,
            description: truncate_chars(&info.description, 200),
            audio_tracks: info.audio_tracks.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoFailure {
    pub success: bool,
    pub error: String,
}

impl InfoFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Character-boundary-safe prefix.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
