// MediaEngine boundary: the external extraction/download collaborator

use std::path::PathBuf;

use serde::Deserialize;

use super::errors::DownloadError;
use super::progress::RawProgress;
use super::request::EngineRequest;

/// The external media-extraction engine, treated as a black box.
///
/// `download` blocks until the transfer completes; the progress callback
/// is invoked synchronously from within that call, never from another
/// task or thread. Failures surface as one error value carrying a
/// human-readable message — this layer does not interpret them.
pub trait MediaEngine {
    /// Engine name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Extraction-only: resolve a URL to its metadata without downloading.
    fn extract_info(&self, url: &str) -> Result<Metadata, DownloadError>;

    /// Full download; returns the final local file path.
    fn download(
        &self,
        request: &EngineRequest,
        on_progress: &mut dyn FnMut(RawProgress),
    ) -> Result<PathBuf, DownloadError>;
}

/// Engine process configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Explicit binary path; otherwise `$TUBEGRAB_YTDLP`, then well-known
    /// install locations, then `PATH`.
    pub binary: Option<PathBuf>,
    /// Per-connection timeout handed through to the engine.
    pub socket_timeout_secs: u32,
    /// Hard ceiling on a metadata extraction call.
    pub extract_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: None,
            socket_timeout_secs: 15,
            extract_timeout_secs: 60,
        }
    }
}

impl EngineConfig {
    pub fn with_binary(mut self, binary: Option<PathBuf>) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_socket_timeout(mut self, seconds: u32) -> Self {
        self.socket_timeout_secs = seconds;
        self
    }

    pub fn with_extract_timeout(mut self, seconds: u64) -> Self {
        self.extract_timeout_secs = seconds;
        self
    }
}

/// Metadata returned by an extraction-only call. Field names follow the
/// engine's JSON dump; everything is optional because site extractors
/// differ in what they fill in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
    /// Present only for playlist URLs.
    #[serde(default)]
    pub entries: Option<Vec<PlaylistEntry>>,
}

impl Metadata {
    /// Highest-preference thumbnail, falling back to the flat field.
    pub fn best_thumbnail(&self) -> Option<String> {
        self.thumbnails
            .iter()
            .max_by_key(|thumbnail| thumbnail.preference.unwrap_or(0))
            .map(|thumbnail| thumbnail.url.clone())
            .or_else(|| self.thumbnail.clone())
    }

    pub fn entry_count(&self) -> Option<usize> {
        self.entries.as_ref().map(Vec::len)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub preference: Option<i64>,
}

/// One raw per-format track descriptor from the engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatDescriptor {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl FormatDescriptor {
    /// An audio stream with no video track.
    pub fn is_audio_only(&self) -> bool {
        self.acodec.as_deref().is_some_and(|codec| codec != "none")
            && self.vcodec.as_deref() == Some("none")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub title: Option<String>,
}
