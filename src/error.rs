use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrayError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid snapshot {}: {reason}", path.display())]
    InvalidSnapshot { path: PathBuf, reason: String },

    #[error("Invalid event at {}:{line}: {reason}", path.display())]
    InvalidEvent {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dispatcher error: {0}")]
    Dispatcher(String),
}

impl TrayError {
    /// Returns a user-friendly suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            TrayError::FileNotFound { .. } => {
                Some("Check the path exists and spelling is correct.")
            }
            TrayError::InvalidSnapshot { .. } => {
                Some("A snapshot is a JSON array of transfers, e.g. [{\"tag\": 1, \"direction\": \"download\", \"file_name\": \"a.txt\"}]")
            }
            TrayError::InvalidEvent { .. } => {
                Some("Each line must be one JSON event: {\"event\": \"start\"|\"update\"|\"temporary_error\"|\"finish\", \"transfer\": {...}}")
            }
            TrayError::Config(_) => {
                Some("Check config.toml, or print the effective settings with `ttray config`.")
            }
            _ => None,
        }
    }
}

impl From<toml::ser::Error> for TrayError {
    fn from(err: toml::ser::Error) -> Self {
        TrayError::Config(format!("TOML serialization error: {}", err))
    }
}

impl From<tokio::task::JoinError> for TrayError {
    fn from(err: tokio::task::JoinError) -> Self {
        TrayError::Dispatcher(err.to_string())
    }
}
