//! Error types for text extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort extraction of a whole file.
///
/// Failures on individual pages never surface here; they are logged and
/// the page contributes no text.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("No read permission for PDF file at {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Error processing PDF {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Classify an IO error raised while opening `path`.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ExtractError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied(path),
            _ => ExtractError::Io { path, source },
        }
    }
}
