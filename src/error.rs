//! Error types for Fluxview.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Fluxview operations.
pub type Result<T> = std::result::Result<T, FluxError>;

/// Errors that can occur in Fluxview.
#[derive(Debug, Error)]
pub enum FluxError {
    /// Failed to open a replay file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to connect to the telemetry WebSocket.
    #[error("Failed to connect to {url}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying WebSocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// Standard input was already consumed by an earlier replay.
    #[error("Standard input can only be replayed once per run")]
    StdinConsumed,

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to access clipboard.
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FluxError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a Connect error.
    pub fn connect(url: impl Into<String>, source: tungstenite::Error) -> Self {
        Self::Connect {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
