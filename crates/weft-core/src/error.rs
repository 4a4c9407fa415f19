//! Errors raised while loading documents and merging configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for document and configuration operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading or merging workflow documents.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document could not be read from disk.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path of the unreadable document.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The document is not valid YAML or does not match the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        /// Underlying parser failure.
        source: serde_yaml::Error,
    },

    /// Two configuration sources define the same action type differently.
    #[error("action type {name} is declared with conflicting {field} values")]
    ConfigurationConflict {
        /// Name of the conflicting action type.
        name: String,
        /// Field whose values disagree (`tag` or `xmlns`).
        field: &'static str,
    },
}
