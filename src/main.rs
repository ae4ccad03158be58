// CLI entry point

use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tubegrab::cli::{self, Cli};
use tubegrab::console::{self, ConsoleSink};
use tubegrab::downloader::{Downloader, EngineConfig, MediaKind, YtDlpEngine};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.no_banner {
        console::print_banner();
    }

    let urls = match collect_urls(&cli) {
        Ok(urls) => urls,
        Err(code) => return code,
    };

    let engine = YtDlpEngine::new(EngineConfig::default());
    let downloader = Downloader::new(Box::new(engine), cli.output.clone());

    if cli.info {
        return show_info(&downloader, &urls);
    }

    let options = cli.download_options();
    let mut sink = ConsoleSink;

    if cli.playlist {
        if urls.len() > 1 {
            println!(
                "{}",
                "Warning: multiple URLs provided with -p. Only the first is treated as a playlist."
                    .yellow()
            );
        }
        println!("\n{}", format!("Downloading playlist: {}", urls[0]).yellow());
        match downloader.download_playlist(&urls[0], &options, Some(cli.playlist_range()), &mut sink)
        {
            Ok(_) => {
                println!("\n{}", "All downloads completed successfully!".green());
                print_saved_to(&cli.output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("\n{}", format!("Playlist download failed: {e}").red());
                ExitCode::FAILURE
            }
        }
    } else if urls.len() > 1 {
        println!(
            "\n{}",
            format!("Starting batch download of {} items...", urls.len()).cyan()
        );
        let outcome = downloader.download_all(&urls, &options, &mut sink);
        console::print_batch_summary(outcome.succeeded(), outcome.total());
        let failed: Vec<&str> = outcome.failed_urls().collect();
        if !failed.is_empty() {
            println!("{}", "Some downloads failed:".yellow());
            for url in failed {
                println!("  {}", format!("✗ {url}").red());
            }
        }
        print_saved_to(&cli.output);
        ExitCode::SUCCESS
    } else {
        let label = match options.media_kind {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        };
        println!("\n{}", format!("Downloading {label}: {}", urls[0]).yellow());
        match downloader.download(&urls[0], &options, &mut sink) {
            Ok(_) => {
                println!("\n{}", "Download completed successfully!".green());
                print_saved_to(&cli.output);
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("\n{}", format!("Download failed: {e}").red());
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Input errors terminate the invocation before the engine is touched.
fn collect_urls(cli: &Cli) -> Result<Vec<String>, ExitCode> {
    if let Some(path) = &cli.file {
        match cli::read_urls_from_file(path) {
            Ok(urls) if !urls.is_empty() => Ok(urls),
            Ok(_) => {
                println!("{}", "No valid URLs found in file".red());
                Err(ExitCode::FAILURE)
            }
            Err(e) => {
                println!(
                    "{}",
                    format!("Error reading file {}: {e}", path.display()).red()
                );
                Err(ExitCode::FAILURE)
            }
        }
    } else if !cli.urls.is_empty() {
        Ok(cli.urls.clone())
    } else {
        let _ = Cli::command().print_help();
        Err(ExitCode::FAILURE)
    }
}

fn show_info(downloader: &Downloader, urls: &[String]) -> ExitCode {
    for url in urls {
        println!("\n{} {url}", "Getting info for:".cyan());
        match downloader.video_info(url) {
            Ok(info) => console::print_info(&info),
            Err(e) => println!("{}", format!("Error getting video info: {e}").red()),
        }
    }
    ExitCode::SUCCESS
}

fn print_saved_to(output: &Path) {
    let absolute = output
        .canonicalize()
        .unwrap_or_else(|_| output.to_path_buf());
    println!(
        "{}",
        format!("Files saved to: {}", absolute.display()).cyan()
    );
}
