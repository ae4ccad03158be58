// yt-dlp process engine

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::engine::{EngineConfig, MediaEngine, Metadata};
use super::errors::DownloadError;
use super::progress::RawProgress;
use super::request::{EngineRequest, Postprocessor};

/// Sentinel prefixes for machine-readable stdout lines.
const PROGRESS_TAG: &str = "TG_PROGRESS";
const OUTPUT_TAG: &str = "TG_OUTPUT";

/// Emitted repeatedly while a stream transfers. Pipe-separated so the
/// reader never has to guess at yt-dlp's human formatting.
const PROGRESS_TEMPLATE: &str = "download:TG_PROGRESS|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

/// Printed once per finished item, after postprocessing has moved the file
/// into place — so the path is already extension-correct for extracted audio.
const OUTPUT_PRINT: &str = "after_move:TG_OUTPUT|%(filepath)s";

pub struct YtDlpEngine {
    binary: String,
    config: EngineConfig,
}

impl YtDlpEngine {
    pub fn new(config: EngineConfig) -> Self {
        let binary = config
            .binary
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .or_else(|| std::env::var("TUBEGRAB_YTDLP").ok())
            .unwrap_or_else(find_ytdlp);
        Self { binary, config }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn extract_info(&self, url: &str) -> Result<Metadata, DownloadError> {
        let args = vec![
            "--dump-single-json".to_string(),
            "--flat-playlist".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.config.socket_timeout_secs.to_string(),
            url.to_string(),
        ];
        debug!(binary = %self.binary, url, "extracting metadata");

        let output = run_with_timeout(
            &self.binary,
            &args,
            Duration::from_secs(self.config.extract_timeout_secs),
        )?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::Engine(last_error_line(&stderr)));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::Parse(format!("metadata JSON: {e}")))
    }

    fn download(
        &self,
        request: &EngineRequest,
        on_progress: &mut dyn FnMut(RawProgress),
    ) -> Result<PathBuf, DownloadError> {
        let args = build_download_args(request, self.config.socket_timeout_secs);
        debug!(binary = %self.binary, url = %request.url, "starting download");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DownloadError::EngineNotFound(format!("{}: {e}", self.binary)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Engine("failed to capture engine stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Engine("failed to capture engine stderr".to_string()))?;

        // Drain stderr on the side so the engine can never block on a full pipe.
        let stderr_handle = thread::spawn(move || {
            let reader = BufReader::new(stderr);
            let mut lines = Vec::new();
            for line in reader.lines().map_while(Result::ok) {
                lines.push(line);
            }
            lines.join("\n")
        });

        let mut final_path: Option<PathBuf> = None;
        let mut destination: Option<PathBuf> = None;
        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(Result::ok) {
            if let Some(raw) = parse_progress_line(&line) {
                on_progress(raw);
            } else if let Some(path) = parse_output_line(&line) {
                final_path = Some(path);
            } else if let Some(path) = parse_destination_line(&line) {
                destination = Some(path);
            }
        }

        let status = child.wait()?;
        let stderr_output = stderr_handle.join().unwrap_or_default();

        if !status.success() {
            return Err(DownloadError::Engine(last_error_line(&stderr_output)));
        }

        // The after-move print is authoritative; the Destination line is a
        // fallback for engine builds that never emit it.
        final_path.or(destination).ok_or_else(|| {
            DownloadError::Parse("engine reported success but printed no output path".to_string())
        })
    }
}

/// Locate yt-dlp: well-known install locations first, then `PATH`.
fn find_ytdlp() -> String {
    let known = [
        "/opt/homebrew/bin/yt-dlp",
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
    ];
    for path in known {
        if Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = Command::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return path;
            }
        }
    }

    "yt-dlp".to_string()
}

/// Full argv for one download, minus the binary itself.
fn build_download_args(request: &EngineRequest, socket_timeout_secs: u32) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        request.format_selector.clone(),
        "--newline".to_string(),
        "--no-warnings".to_string(),
        "--socket-timeout".to_string(),
        socket_timeout_secs.to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "--print".to_string(),
        OUTPUT_PRINT.to_string(),
        "--no-simulate".to_string(),
        "-o".to_string(),
        request.output_template.clone(),
    ];

    if request.single_item {
        args.push("--no-playlist".to_string());
    }
    if let Some(items) = &request.playlist_items {
        args.push("--playlist-items".to_string());
        args.push(items.clone());
    }
    if let Some(container) = &request.merge_container {
        args.push("--merge-output-format".to_string());
        args.push(container.clone());
    }
    if request.write_thumbnail {
        args.push("--write-thumbnail".to_string());
    }
    for postprocessor in &request.postprocessors {
        match postprocessor {
            Postprocessor::ExtractAudio { codec, quality } => {
                args.push("-x".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(quality.clone());
            }
            Postprocessor::EmbedThumbnail => args.push("--embed-thumbnail".to_string()),
            Postprocessor::Metadata => args.push("--embed-metadata".to_string()),
        }
    }

    args.push(request.url.clone());
    args
}

/// Parse one sentinel progress line, e.g.
/// `TG_PROGRESS|downloading|512|1024|NA| 50.0%| 1.00MiB/s|00:05`.
fn parse_progress_line(line: &str) -> Option<RawProgress> {
    let rest = line.strip_prefix(PROGRESS_TAG)?.strip_prefix('|')?;
    let mut fields = rest.split('|');
    let status = fields.next()?;
    Some(RawProgress {
        finished: status == "finished",
        downloaded_bytes: parse_bytes(fields.next()),
        total_bytes: parse_bytes(fields.next()),
        total_bytes_estimate: parse_bytes(fields.next()),
        percent: parse_field(fields.next()),
        speed: parse_field(fields.next()),
        eta: parse_field(fields.next()),
    })
}

fn parse_output_line(line: &str) -> Option<PathBuf> {
    let rest = line.strip_prefix(OUTPUT_TAG)?.strip_prefix('|')?;
    let path = rest.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

lazy_static! {
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
}

fn parse_destination_line(line: &str) -> Option<PathBuf> {
    DEST_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| PathBuf::from(m.as_str().trim()))
}

/// Byte counts arrive as integers, floats, or `NA` depending on the site.
fn parse_bytes(field: Option<&str>) -> Option<u64> {
    let text = field?.trim();
    if text.is_empty() || text == "NA" {
        return None;
    }
    text.parse::<f64>().ok().map(|value| value.max(0.0) as u64)
}

fn parse_field(field: Option<&str>) -> Option<String> {
    let text = field?.trim();
    if text.is_empty() || text == "NA" {
        return None;
    }
    Some(text.to_string())
}

/// The engine writes multi-line noise to stderr; keep the line a human
/// actually wants to read.
fn last_error_line(stderr: &str) -> String {
    let trimmed = stderr.lines().map(str::trim);
    trimmed
        .clone()
        .rev()
        .find(|line| line.starts_with("ERROR"))
        .or_else(|| trimmed.rev().find(|line| !line.is_empty()))
        .unwrap_or("engine failed with no diagnostic output")
        .to_string()
}

/// Run a short-lived engine call to completion with a hard deadline.
///
/// Both pipes are drained on side threads so a chatty child can never
/// deadlock against a full pipe buffer while we poll for exit.
fn run_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<Output, DownloadError> {
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DownloadError::EngineNotFound(format!("{program}: {e}")))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Engine("failed to capture engine stdout".to_string()))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Engine("failed to capture engine stderr".to_string()))?;

    let stdout_task = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout_pipe.read_to_end(&mut buf);
        buf
    });
    let stderr_task = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr_pipe.read_to_end(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DownloadError::Timeout(timeout.as_secs()));
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(e.into()),
        }
    };

    let stdout = stdout_task.join().unwrap_or_default();
    let stderr = stderr_task.join().unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::{DownloadOptions, DownloadRequest, PlaylistRange};
    use crate::downloader::request::build_engine_request;

    fn engine_request(options: DownloadOptions, playlist: Option<PlaylistRange>) -> EngineRequest {
        let tmp = tempfile::tempdir().unwrap();
        let request = match playlist {
            Some(range) => DownloadRequest::playlist(
                "https://example.com/list",
                options,
                tmp.path().into(),
                Some(range),
            ),
            None => DownloadRequest::single("https://example.com/v", options, tmp.path().into()),
        };
        build_engine_request(&request).unwrap()
    }

    #[test]
    fn progress_line_parses_all_fields() {
        let line = "TG_PROGRESS|downloading|512|1024|NA| 50.0%|  1.00MiB/s|00:05";
        let raw = parse_progress_line(line).unwrap();
        assert!(!raw.finished);
        assert_eq!(raw.downloaded_bytes, Some(512));
        assert_eq!(raw.total_bytes, Some(1024));
        assert_eq!(raw.total_bytes_estimate, None);
        assert_eq!(raw.percent.as_deref(), Some("50.0%"));
        assert_eq!(raw.speed.as_deref(), Some("1.00MiB/s"));
        assert_eq!(raw.eta.as_deref(), Some("00:05"));
    }

    #[test]
    fn progress_line_accepts_float_byte_counts() {
        let line = "TG_PROGRESS|downloading|1023.7|NA|2048.2|NA|NA|NA";
        let raw = parse_progress_line(line).unwrap();
        assert_eq!(raw.downloaded_bytes, Some(1023));
        assert_eq!(raw.total_bytes, None);
        assert_eq!(raw.total_bytes_estimate, Some(2048));
    }

    #[test]
    fn finished_status_is_recognized() {
        let raw = parse_progress_line("TG_PROGRESS|finished|1024|1024|NA|100%|NA|00:00").unwrap();
        assert!(raw.finished);
    }

    #[test]
    fn unrelated_lines_are_not_progress() {
        assert!(parse_progress_line("[download] 50% of 1MiB").is_none());
        assert!(parse_progress_line("TG_OUTPUT|/tmp/a.mp4").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn output_line_yields_final_path() {
        let path = parse_output_line("TG_OUTPUT|/downloads/My Clip.mp3").unwrap();
        assert_eq!(path, PathBuf::from("/downloads/My Clip.mp3"));
        assert!(parse_output_line("TG_OUTPUT|").is_none());
        assert!(parse_output_line("something else").is_none());
    }

    #[test]
    fn destination_line_is_a_fallback_path() {
        let line = "[download] Destination: downloads/My Clip.f137.mp4";
        let path = parse_destination_line(line).unwrap();
        assert_eq!(path, PathBuf::from("downloads/My Clip.f137.mp4"));
        assert!(parse_destination_line("[Merger] Merging formats").is_none());
    }

    #[test]
    fn video_args_carry_merge_container_and_single_item() {
        let args = build_download_args(&engine_request(DownloadOptions::video(), None), 15);
        assert!(args.contains(&"--no-playlist".to_string()));
        let merge = args.iter().position(|a| a == "--merge-output-format").unwrap();
        assert_eq!(args[merge + 1], "mp4");
        assert!(!args.contains(&"-x".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/v");
    }

    #[test]
    fn audio_args_extract_instead_of_muxing() {
        let mut options = DownloadOptions::audio();
        options.quality = "320".to_string();
        let args = build_download_args(&engine_request(options, None), 15);
        assert!(args.contains(&"-x".to_string()));
        let codec = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[codec + 1], "mp3");
        let bitrate = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[bitrate + 1], "320");
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn playlist_args_carry_item_range() {
        let args = build_download_args(
            &engine_request(DownloadOptions::video(), Some(PlaylistRange::new(3, Some(7)))),
            15,
        );
        assert!(!args.contains(&"--no-playlist".to_string()));
        let items = args.iter().position(|a| a == "--playlist-items").unwrap();
        assert_eq!(args[items + 1], "3-7");
    }

    #[test]
    fn embed_flags_map_to_engine_switches() {
        let mut options = DownloadOptions::video();
        options.embed_thumbnail = true;
        options.embed_metadata = true;
        let args = build_download_args(&engine_request(options, None), 15);
        assert!(args.contains(&"--write-thumbnail".to_string()));
        assert!(args.contains(&"--embed-thumbnail".to_string()));
        assert!(args.contains(&"--embed-metadata".to_string()));
    }

    #[test]
    fn last_error_line_prefers_engine_errors() {
        let stderr = "WARNING: something minor\nERROR: Video unavailable\n";
        assert_eq!(last_error_line(stderr), "ERROR: Video unavailable");
        assert_eq!(last_error_line("plain failure\n"), "plain failure");
        assert_eq!(
            last_error_line(""),
            "engine failed with no diagnostic output"
        );
    }
}
