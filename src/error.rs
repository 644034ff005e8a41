//! Error types surfaced by the analysis pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned to callers of the loader, metric engine and pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Dataset root does not exist
    #[error("dataset path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// An aggregation was requested for a table that was never loaded
    #[error("required table missing: {0}")]
    MissingTable(&'static str),

    /// A table was loaded but none of its rows carry a required column
    #[error("table '{table}' has no '{column}' column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to build loader thread pool: {0}")]
    ThreadPool(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to read the embedded metadata of a single frame image.
///
/// Never escapes the loader: the frame keeps zero-valued metadata instead.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("png decode failed: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("metadata key {key} is not an integer: {value:?}")]
    NotAnInteger { key: String, value: String },
}
