// Command-line argument definitions

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::downloader::{DownloadOptions, PlaylistRange};

#[derive(Debug, Parser)]
#[command(
    name = "tubegrab",
    version,
    about = "Download videos and audio from YouTube with ease"
)]
pub struct Cli {
    /// Video or playlist URL(s) to download
    pub urls: Vec<String>,

    /// Download audio only (default: MP3)
    #[arg(short = 'a', long = "audio")]
    pub audio: bool,

    /// Download entire playlist
    #[arg(short = 'p', long)]
    pub playlist: bool,

    /// Read URLs from a text file (one URL per line)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long, value_name = "DIR", default_value = "downloads")]
    pub output: PathBuf,

    /// Output format (mp4, webm, mkv for video; mp3, m4a, opus for audio)
    #[arg(short = 'F', long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Quality (best, 1080p, 720p, 480p for video; 128, 192, 256, 320 for audio bitrate)
    #[arg(short = 'q', long, value_name = "QUALITY")]
    pub quality: Option<String>,

    /// Playlist: start from video N
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub start: u32,

    /// Playlist: end at video N (inclusive)
    #[arg(long, value_name = "N")]
    pub end: Option<u32>,

    /// Show video information without downloading
    #[arg(short = 'i', long)]
    pub info: bool,

    /// Hide banner
    #[arg(long)]
    pub no_banner: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve flags into download options, defaulting by mode.
    pub fn download_options(&self) -> DownloadOptions {
        let mut options = if self.audio {
            DownloadOptions::audio()
        } else {
            DownloadOptions::video()
        };
        if let Some(format) = &self.format {
            options.container = format.clone();
        }
        if let Some(quality) = &self.quality {
            options.quality = quality.clone();
        }
        options
    }

    pub fn playlist_range(&self) -> PlaylistRange {
        PlaylistRange::new(self.start, self.end)
    }
}

/// One URL per line; blank lines and `#` comments are ignored.
pub fn read_urls_from_file(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
