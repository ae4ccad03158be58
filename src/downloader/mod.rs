// Download pipeline: option translation, engine boundary, orchestration

pub mod engine;
pub mod errors;
pub mod format;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod tracks;
pub mod ytdlp;

pub use engine::{EngineConfig, FormatDescriptor, MediaEngine, Metadata};
pub use errors::DownloadError;
pub use models::{
    AudioTrack, DownloadOptions, DownloadRequest, DownloadResult, MediaKind, Phase,
    PlaylistRange, ProgressEvent, VideoInfo,
};
pub use orchestrator::{BatchOutcome, Downloader};
pub use progress::{ProgressSink, RawProgress};
pub use ytdlp::YtDlpEngine;
