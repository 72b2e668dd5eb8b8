//! Crate-level error type.
//!
//! Each variant carries enough context to diagnose the failure without
//! needing to inspect the originating error directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    /// The backend replied with a non-2xx HTTP status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// A TCP-level connection could not be established.
    #[error("connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },

    /// Response body could not be parsed as the expected JSON structure.
    #[error("JSON decode error in {context}: {detail}")]
    Json { context: String, detail: String },

    /// The ingestion endpoint rejected the uploaded document.
    #[error("upload rejected: {detail}")]
    Upload { detail: String },

    /// The config file exists but could not be read or parsed.
    #[error("config error in {path}: {detail}")]
    Config { path: String, detail: String },

    /// No speech engine is configured for this run.
    #[error("speech capture is not available")]
    SpeechUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
