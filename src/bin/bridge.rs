// IPC bridge: line-delimited JSON protocol for a parent process.
//
// stdout carries the protocol; all diagnostics stay on stderr.

use std::env;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use tubegrab::downloader::{Downloader, EngineConfig, YtDlpEngine};
use tubegrab::ipc::{self, BridgeEvent, BridgeOptions, BridgeSink, InfoFailure, InfoResponse};

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        ipc::emit_bare_error("No command specified", None);
        return ExitCode::FAILURE;
    };

    match command.as_str() {
        "get-info" => get_info(args.get(1)),
        "download" => download(args.get(1)),
        other => {
            ipc::emit_bare_error(&format!("Unknown command: {other}"), None);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn new_downloader(output_dir: impl Into<std::path::PathBuf>) -> Downloader {
    Downloader::new(
        Box::new(YtDlpEngine::new(EngineConfig::default())),
        output_dir,
    )
}

/// `get-info <url>` — one JSON object, success or failure; exits 0 for
/// both so the parent can distinguish protocol errors from site errors.
fn get_info(url: Option<&String>) -> ExitCode {
    let Some(url) = url else {
        ipc::emit_bare_error("No URL specified", None);
        return ExitCode::FAILURE;
    };

    let downloader = new_downloader("downloads");
    match downloader.video_info(url) {
        Ok(info) => ipc::emit_json(&InfoResponse::from_info(&info)),
        Err(e) => ipc::emit_json(&InfoFailure::new(e.to_string())),
    }
    ExitCode::SUCCESS
}

/// `download <json-options>` — zero or more progress events, then exactly
/// one complete or error event. Input errors get a bare error line and a
/// non-zero exit before the engine is touched.
fn download(options_json: Option<&String>) -> ExitCode {
    let Some(raw) = options_json else {
        ipc::emit_bare_error("No options specified", None);
        return ExitCode::FAILURE;
    };

    let options: BridgeOptions = match serde_json::from_str(raw) {
        Ok(options) => options,
        Err(e) => {
            ipc::emit_bare_error("Invalid JSON options", Some(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let Some(url) = options.url.clone().filter(|url| !url.is_empty()) else {
        ipc::emit_bare_error("Download failed", Some("no URL in options"));
        return ExitCode::FAILURE;
    };

    let downloader = new_downloader(options.output_folder.clone());
    let mut sink = BridgeSink;
    match downloader.download(&url, &options.download_options(), &mut sink) {
        Ok(path) => {
            ipc::emit(&BridgeEvent::Complete {
                filename: path.display().to_string(),
            });
        }
        Err(e) => {
            // Engine failures ride the typed event stream.
            ipc::emit(&BridgeEvent::Error {
                error: "Download failed".to_string(),
                details: Some(e.to_string()),
            });
        }
    }
    ExitCode::SUCCESS
}
