//! Output errors.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Result type for output operations.
pub type OozieResult<T> = Result<T, OozieError>;

/// Errors that can occur while writing or rendering workflow output.
#[derive(Debug, Error)]
pub enum OozieError {
    /// An output file or directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Path of the output that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The XML writer failed on an in-memory buffer.
    #[error("failed to serialize workflow XML: {0}")]
    Serialize(#[source] std::io::Error),

    /// The serialized document is not valid UTF-8.
    #[error("serialized workflow XML is not valid UTF-8")]
    Encoding(#[from] FromUtf8Error),

    /// The `dot` executable could not be started.
    #[error("failed to run dot on {}: {source}", path.display())]
    Render {
        /// DOT file being rendered.
        path: PathBuf,
        /// Underlying spawn failure.
        source: std::io::Error,
    },

    /// The `dot` executable exited unsuccessfully.
    #[error("dot exited with {status} while rendering {}", path.display())]
    RenderStatus {
        /// DOT file being rendered.
        path: PathBuf,
        /// Exit status of the process.
        status: ExitStatus,
    },
}
