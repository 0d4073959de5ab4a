use std::io;
use thiserror::Error;

use crate::core::manifest::ManifestError;

/// Custom error type for the asset manager
#[derive(Error, Debug)]
pub enum AamError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("External songs could not be re-imported: {}", .0.join("; "))]
    ExternalReimport(Vec<String>),

    #[error("Packaging failed: {0}")]
    Package(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the asset manager
pub type Result<T> = std::result::Result<T, AamError>;

impl AamError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AamError::Config(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        AamError::InvalidPath(msg.into())
    }

    /// Create an import error
    pub fn import<S: Into<String>>(msg: S) -> Self {
        AamError::Import(msg.into())
    }

    /// Create a packaging error
    pub fn package<S: Into<String>>(msg: S) -> Self {
        AamError::Package(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AamError::Other(msg.into())
    }
}
