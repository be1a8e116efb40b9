//! Error types for the pagesnap library.

use std::io;
use thiserror::Error;

/// Result type alias for pagesnap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during region export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when writing the exported file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Capture or document assembly failed.
    ///
    /// Covers a detached region, a capture backend failure, a degenerate
    /// raster or page format, and PDF serialization failures.
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

impl Error {
    /// Generic message suitable for an end-user notice.
    ///
    /// Diagnostic detail is logged at the pipeline boundary; callers show
    /// this single message regardless of the underlying cause.
    pub fn user_notice(&self) -> &'static str {
        "Failed to export PDF. Please try again."
    }
}
