use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Missing file: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Server(std::io::Error),
}
impl BeaconError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BeaconError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        BeaconError::Parse {
            line,
            message: message.into(),
        }
    }
    /// Short machine-readable reason used in HTTP error bodies.
    pub fn reason(&self) -> &'static str {
        match self {
            BeaconError::NotFound(_) => "not_found",
            BeaconError::Parse { .. } | BeaconError::Json(_) => "parse_error",
            BeaconError::Io { .. } => "io_error",
            BeaconError::InvalidPath(_) => "invalid_path",
            BeaconError::InvalidPattern(_) => "invalid_pattern",
            BeaconError::InvalidDocument(_) => "invalid_document",
            BeaconError::Bind { .. } => "bind_error",
            BeaconError::Server(_) => "server_error",
        }
    }
}
