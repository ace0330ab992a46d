//! Error types for file I/O operations.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for file I/O operations.
///
/// Each variant represents a specific failure mode in the I/O pipeline.
#[derive(Error, Debug)]
pub enum IoError {
    /// File does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// File exceeds size limit.
    #[error("File too large: {0} bytes (limit: {1})")]
    TooLarge(u64, u64),

    /// File contains binary content (NULL bytes detected).
    #[error("Binary file detected")]
    BinaryFile,

    /// Character that cannot be written back in the file's encoding.
    #[error("Character {0:?} cannot be encoded as Latin-1")]
    Unencodable(char),

    /// Low-level I/O error from std::io, with the path it happened on.
    #[error("IO error on {path}: {source}")]
    System {
        /// Path being read, written or removed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    pub(crate) fn system(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::System {
            path: path.display().to_string(),
            source,
        }
    }
}
