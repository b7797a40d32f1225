//! Error types for quarto-vdoc

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to create virtual document directory {path}: {source}")]
    CreateTempDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write virtual document {path}: {source}")]
    WriteVirtualDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot express path as a file URI: {0}")]
    InvalidPath(PathBuf),

    #[error("Invalid virtual document URI: {0}")]
    InvalidUri(String),

    #[error("Host failed to open {uri}: {message}")]
    OpenDocument { uri: String, message: String },

    #[error("Host failed to delete {uri}: {message}")]
    DeleteFile { uri: String, message: String },

    #[error("Provider execution failed: {0}")]
    Provider(String),

    #[error("Provider returned a {found} result for a {expected} request")]
    UnexpectedResponse {
        expected: crate::types::RequestKind,
        found: crate::types::RequestKind,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
