//! Thin wrapper around an external media-extraction engine (yt-dlp):
//! option-to-directive translation, progress relay, and output
//! organization, shared by the `tubegrab` CLI and the `tubegrab-bridge`
//! IPC binary.

pub mod cli;
pub mod console;
pub mod downloader;
pub mod ipc;
