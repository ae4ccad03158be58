// Sequencing layer: one engine invocation per request, no parallelism

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::engine::{MediaEngine, Metadata};
use super::errors::DownloadError;
use super::models::{
    DownloadOptions, DownloadRequest, DownloadResult, PlaylistRange, VideoInfo,
};
use super::progress::{self, ProgressSink, RawProgress};
use super::request::build_engine_request;
use super::tracks;

/// Front door of the download pipeline. Holds the injected engine and the
/// configured output directory; everything else is request-scoped.
pub struct Downloader {
    engine: Box<dyn MediaEngine>,
    output_dir: PathBuf,
}

/// Aggregate outcome of a batch run. Results keep input order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<DownloadResult>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.success).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failed_urls(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|result| !result.success)
            .map(|result| result.url.as_str())
    }
}

impl Downloader {
    pub fn new(engine: Box<dyn MediaEngine>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Metadata for one URL, without downloading anything.
    pub fn video_info(&self, url: &str) -> Result<VideoInfo, DownloadError> {
        let metadata = self.engine.extract_info(url)?;
        Ok(video_info_from(&metadata))
    }

    /// Download one URL. Progress events reach the sink synchronously from
    /// within the blocking engine call.
    pub fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, DownloadError> {
        let request = DownloadRequest::single(url, options.clone(), self.output_dir.clone());
        self.run(&request, sink)
    }

    /// Download several independent URLs in order. A failing URL is
    /// recorded and the iteration continues; nothing aborts early.
    pub fn download_all(
        &self,
        urls: &[String],
        options: &DownloadOptions,
        sink: &mut dyn ProgressSink,
    ) -> BatchOutcome {
        let mut results = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            sink.item_started(index + 1, urls.len(), url);
            info!("downloading {}/{}: {url}", index + 1, urls.len());
            let result = match self.download(url, options, sink) {
                Ok(path) => DownloadResult::succeeded(url, path),
                Err(e) => {
                    warn!("download failed for {url}: {e}");
                    DownloadResult::failed(url, e.to_string())
                }
            };
            results.push(result);
        }
        BatchOutcome { results }
    }

    /// Download a playlist as one engine invocation. The engine fans out
    /// over the entries internally, so success is reported for the
    /// playlist as a whole — per-item granularity is whatever the engine
    /// gives us, which is a known limitation.
    pub fn download_playlist(
        &self,
        url: &str,
        options: &DownloadOptions,
        range: Option<PlaylistRange>,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, DownloadError> {
        let metadata = self.engine.extract_info(url)?;
        if let Some(count) = metadata.entry_count() {
            info!("found {count} entries in playlist");
        }
        let request =
            DownloadRequest::playlist(url, options.clone(), self.output_dir.clone(), range);
        self.run(&request, sink)
    }

    fn run(
        &self,
        request: &DownloadRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<PathBuf, DownloadError> {
        let engine_request = build_engine_request(request)?;
        let mut forward = |raw: RawProgress| {
            if let Some(event) = progress::normalize(&raw) {
                sink.progress(&event);
            }
        };
        self.engine.download(&engine_request, &mut forward)
    }
}

fn video_info_from(metadata: &Metadata) -> VideoInfo {
    VideoInfo {
        title: metadata
            .title
            .clone()
            .unwrap_or_else(|| "Unknown Title".to_string()),
        duration_seconds: metadata.duration.unwrap_or(0.0).max(0.0) as u64,
        uploader: metadata
            .uploader
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        view_count: metadata.view_count.unwrap_or(0),
        description: metadata.description.clone().unwrap_or_default(),
        thumbnail: metadata.best_thumbnail(),
        audio_tracks: tracks::enumerate(&metadata.formats),
    }
}
