// Console presentation for the CLI binary

use std::io::{self, Write};

use colored::Colorize;

use crate::downloader::{Phase, ProgressEvent, ProgressSink, VideoInfo};

pub fn print_banner() {
    let banner = "\
╔══════════════════════════════════════════════════════════╗
║           tubegrab v1.0                                  ║
║  Download videos and audio from YouTube with ease        ║
╚══════════════════════════════════════════════════════════╝";
    println!("{}\n", banner.cyan());
}

/// Progress sink that redraws a single console line per event.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn item_started(&mut self, index: usize, total: usize, url: &str) {
        println!("\n{}", format!("[{index}/{total}]").magenta());
        println!("{}", format!("Downloading: {url}").yellow());
    }

    fn progress(&mut self, event: &ProgressEvent) {
        match event.phase {
            Phase::Downloading => {
                let line = format!(
                    "Downloading: {}% at {} ETA: {}",
                    event.percent, event.speed, event.eta
                );
                print!("\r{}", line.cyan());
                let _ = io::stdout().flush();
            }
            Phase::Finished => {
                println!("\r{}", "Download completed! Processing...".green());
            }
        }
    }
}

pub fn print_info(info: &VideoInfo) {
    println!("{} {}", "Title:".green(), info.title);
    println!("{} {}", "Uploader:".green(), info.uploader);
    println!("{} {} seconds", "Duration:".green(), info.duration_seconds);
    println!("{} {}", "Views:".green(), format_views(info.view_count));
}

pub fn print_batch_summary(succeeded: usize, total: usize) {
    let rule = "=".repeat(60);
    println!("\n{}", rule.cyan());
    println!(
        "{}",
        format!("Completed: {succeeded}/{total} successful").green()
    );
    println!("{}\n", rule.cyan());
}

/// Thousands separators: `1234567` -> `1,234,567`.
pub fn format_views(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_get_thousands_separators() {
        assert_eq!(format_views(0), "0");
        assert_eq!(format_views(999), "999");
        assert_eq!(format_views(1000), "1,000");
        assert_eq!(format_views(1234567), "1,234,567");
        assert_eq!(format_views(1000000000), "1,000,000,000");
    }
}
