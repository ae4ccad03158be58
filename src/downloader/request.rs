// Directive assembly for the extraction engine

use std::fs;

use super::errors::DownloadError;
use super::format;
use super::models::{DownloadRequest, MediaKind};

const SINGLE_TEMPLATE: &str = "%(title)s.%(ext)s";
const PLAYLIST_TEMPLATE: &str = "%(playlist_index)s - %(title)s.%(ext)s";

/// A post-download transformation applied by the engine, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postprocessor {
    ExtractAudio { codec: String, quality: String },
    EmbedThumbnail,
    Metadata,
}

/// The full directive set handed to the engine for one request.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub url: String,
    pub format_selector: String,
    /// Filename template with the output directory already joined in.
    pub output_template: String,
    /// Container the engine should mux into; video requests only.
    pub merge_container: Option<String>,
    pub postprocessors: Vec<Postprocessor>,
    /// `"start-end"` or `"start-"`; absent when the whole list is wanted.
    pub playlist_items: Option<String>,
    /// Keep the raw thumbnail on disk so embedding has something to embed.
    pub write_thumbnail: bool,
    /// Restrict a video URL that also carries a list id to the single item.
    pub single_item: bool,
}

/// Assemble engine directives for one request and make sure the output
/// directory exists (create-if-absent).
pub fn build_engine_request(request: &DownloadRequest) -> Result<EngineRequest, DownloadError> {
    fs::create_dir_all(&request.output_dir)?;

    let options = &request.options;
    let template = if request.playlist {
        PLAYLIST_TEMPLATE
    } else {
        SINGLE_TEMPLATE
    };
    let output_template = request
        .output_dir
        .join(template)
        .to_string_lossy()
        .into_owned();

    let mut postprocessors = Vec::new();
    if options.media_kind == MediaKind::Audio {
        postprocessors.push(Postprocessor::ExtractAudio {
            codec: options.container.clone(),
            quality: options.quality.clone(),
        });
    }
    if options.embed_thumbnail {
        postprocessors.push(Postprocessor::EmbedThumbnail);
    }
    if options.embed_metadata {
        postprocessors.push(Postprocessor::Metadata);
    }

    Ok(EngineRequest {
        url: request.url.clone(),
        format_selector: format::format_selector(
            options.media_kind,
            &options.quality,
            &options.audio_track,
        ),
        output_template,
        merge_container: (options.media_kind == MediaKind::Video)
            .then(|| options.container.clone()),
        postprocessors,
        playlist_items: request.playlist_range.and_then(|range| range.directive()),
        write_thumbnail: options.embed_thumbnail,
        single_item: !request.playlist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{DownloadOptions, PlaylistRange};

    fn video_request(dir: &std::path::Path) -> DownloadRequest {
        DownloadRequest::single("https://example.com/watch?v=x", DownloadOptions::video(), dir.into())
    }

    #[test]
    fn creates_output_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out").join("nested");
        let request = video_request(&dir);
        build_engine_request(&request).unwrap();
        assert!(dir.is_dir());
        // Second build must succeed against the existing directory.
        build_engine_request(&request).unwrap();
    }

    #[test]
    fn single_requests_use_title_template() {
        let tmp = tempfile::tempdir().unwrap();
        let built = build_engine_request(&video_request(tmp.path())).unwrap();
        assert!(built.output_template.ends_with("%(title)s.%(ext)s"));
        assert!(!built.output_template.contains("playlist_index"));
        assert!(built.single_item);
    }

    #[test]
    fn playlist_requests_use_indexed_template_and_range() {
        let tmp = tempfile::tempdir().unwrap();
        let request = DownloadRequest::playlist(
            "https://example.com/playlist?list=y",
            DownloadOptions::video(),
            tmp.path().into(),
            Some(PlaylistRange::new(3, Some(7))),
        );
        let built = build_engine_request(&request).unwrap();
        assert!(built
            .output_template
            .ends_with("%(playlist_index)s - %(title)s.%(ext)s"));
        assert_eq!(built.playlist_items, Some("3-7".to_string()));
        assert!(!built.single_item);
    }

    #[test]
    fn full_playlist_has_no_range_directive() {
        let tmp = tempfile::tempdir().unwrap();
        let request = DownloadRequest::playlist(
            "https://example.com/playlist?list=y",
            DownloadOptions::video(),
            tmp.path().into(),
            Some(PlaylistRange::new(1, None)),
        );
        let built = build_engine_request(&request).unwrap();
        assert_eq!(built.playlist_items, None);
    }

    #[test]
    fn audio_requests_extract_audio_and_never_mux() {
        let tmp = tempfile::tempdir().unwrap();
        let mut options = DownloadOptions::audio();
        options.quality = "320".to_string();
        let request = DownloadRequest::single("u", options, tmp.path().into());
        let built = build_engine_request(&request).unwrap();
        assert_eq!(built.merge_container, None);
        assert_eq!(
            built.postprocessors,
            vec![Postprocessor::ExtractAudio {
                codec: "mp3".to_string(),
                quality: "320".to_string(),
            }]
        );
    }

    #[test]
    fn postprocessors_keep_their_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut options = DownloadOptions::audio();
        options.embed_thumbnail = true;
        options.embed_metadata = true;
        let request = DownloadRequest::single("u", options, tmp.path().into());
        let built = build_engine_request(&request).unwrap();
        assert!(matches!(
            built.postprocessors.as_slice(),
            [
                Postprocessor::ExtractAudio { .. },
                Postprocessor::EmbedThumbnail,
                Postprocessor::Metadata,
            ]
        ));
        assert!(built.write_thumbnail);
    }

    #[test]
    fn metadata_embeds_on_video_requests_too() {
        let tmp = tempfile::tempdir().unwrap();
        let mut options = DownloadOptions::video();
        options.embed_metadata = true;
        let request = DownloadRequest::single("u", options, tmp.path().into());
        let built = build_engine_request(&request).unwrap();
        assert_eq!(built.postprocessors, vec![Postprocessor::Metadata]);
        assert_eq!(built.merge_container, Some("mp4".to_string()));
        assert!(!built.write_thumbnail);
    }
}
