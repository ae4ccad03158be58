// Error types for the download pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The engine binary could not be located or started.
    #[error("engine not found: {0}")]
    EngineNotFound(String),

    /// The engine ran and failed; carries its last meaningful stderr line.
    #[error("{0}")]
    Engine(String),

    /// Engine output could not be understood.
    #[error("failed to parse engine output: {0}")]
    Parse(String),

    /// The engine did not finish within the allotted time.
    #[error("engine timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
