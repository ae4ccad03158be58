// Common data models for the download pipeline

use std::path::PathBuf;

use serde::Serialize;

/// What kind of output the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// User-facing download options, shared by the CLI and the bridge.
///
/// For video the quality is a resolution tag (`best`, `1080p`, ...); for
/// audio it is a bitrate in kbps handed to the extract-audio postprocessor.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub media_kind: MediaKind,
    /// Container for video, codec for audio (mp4/webm/mkv vs mp3/m4a/opus).
    pub container: String,
    pub quality: String,
    /// Language id of the preferred audio track, or `auto`.
    pub audio_track: String,
    pub embed_thumbnail: bool,
    pub embed_metadata: bool,
}

impl DownloadOptions {
    pub fn video() -> Self {
        Self {
            media_kind: MediaKind::Video,
            container: "mp4".to_string(),
            quality: "best".to_string(),
            audio_track: "auto".to_string(),
            embed_thumbnail: false,
            embed_metadata: false,
        }
    }

    pub fn audio() -> Self {
        Self {
            media_kind: MediaKind::Audio,
            container: "mp3".to_string(),
            quality: "192".to_string(),
            ..Self::video()
        }
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self::video()
    }
}

/// 1-indexed inclusive bounds restricting which playlist entries are
/// processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PlaylistRange {
    pub fn new(start: u32, end: Option<u32>) -> Self {
        Self { start, end }
    }

    /// Item-range directive for the engine: `"3-7"`, `"5-"`, or `None`
    /// when the range covers the whole playlist.
    pub fn directive(&self) -> Option<String> {
        match self.end {
            Some(end) => Some(format!("{}-{}", self.start, end)),
            None if self.start > 1 => Some(format!("{}-", self.start)),
            None => None,
        }
    }
}

/// One fully specified download, assembled per invocation and discarded
/// after the result is reported.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub options: DownloadOptions,
    pub output_dir: PathBuf,
    /// Playlist requests use an index-prefixed filename template.
    pub playlist: bool,
    pub playlist_range: Option<PlaylistRange>,
}

impl DownloadRequest {
    pub fn single(url: &str, options: DownloadOptions, output_dir: PathBuf) -> Self {
        Self {
            url: url.to_string(),
            options,
            output_dir,
            playlist: false,
            playlist_range: None,
        }
    }

    pub fn playlist(
        url: &str,
        options: DownloadOptions,
        output_dir: PathBuf,
        range: Option<PlaylistRange>,
    ) -> Self {
        Self {
            url: url.to_string(),
            options,
            output_dir,
            playlist: true,
            playlist_range: range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Downloading,
    Finished,
}

/// Uniform snapshot of in-flight transfer state. Speed and ETA labels are
/// forwarded verbatim from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    /// Always within 0..=100.
    pub percent: u8,
    pub speed: String,
    pub eta: String,
}

impl ProgressEvent {
    /// Terminal event: percent forced to 100, zero-valued labels.
    pub fn finished() -> Self {
        Self {
            phase: Phase::Finished,
            percent: 100,
            speed: "0 B/s".to_string(),
            eta: "0s".to_string(),
        }
    }
}

/// Per-URL outcome, append-only once produced.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn succeeded(url: &str, output_path: PathBuf) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            output_path: Some(output_path),
            error: None,
        }
    }

    pub fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            output_path: None,
            error: Some(error),
        }
    }
}

/// A selectable audio track, as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTrack {
    pub id: String,
    /// Display form of the language id (EN, FR, En-Us, ...).
    pub language: String,
    pub description: String,
}

impl AudioTrack {
    /// Synthetic default entry, always listed first.
    pub fn auto() -> Self {
        Self {
            id: "auto".to_string(),
            language: "Auto (Default)".to_string(),
            description: "Default audio track".to_string(),
        }
    }
}

/// Video metadata as presented to the user. The description is kept
/// untruncated here; the bridge caps it when responding to `get-info`.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub title: String,
    pub duration_seconds: u64,
    pub uploader: String,
    pub view_count: u64,
    pub description: String,
    pub thumbnail: Option<String>,
    pub audio_tracks: Vec<AudioTrack>,
}
