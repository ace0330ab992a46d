//! Synchronous file I/O operations.
//!
//! The pipeline is strictly sequential, so there is no async counterpart.

use std::fs as std_fs;
use std::io::Read;
use std::path::Path;

use crate::detect::{DecodedText, TextEncoding, decode_buffer};
use crate::error::IoError;

/// Read text from a file with size and binary checks.
///
/// # Arguments
/// * `path` - Path to the file
/// * `max_bytes` - Maximum file size in bytes
///
/// # Returns
/// Decoded text content and its encoding, or an error.
///
/// # Errors
/// `NotFound` when the file is missing, `TooLarge` past the limit,
/// `BinaryFile` for NULL-byte content, `System` for read failures.
pub fn read_text_safe<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<DecodedText, IoError> {
    let path = path.as_ref();

    let metadata = std_fs::metadata(path)
        .map_err(|_| IoError::NotFound(path.to_string_lossy().to_string()))?;

    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = std_fs::File::open(path).map_err(|e| IoError::system(path, e))?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer)
        .map_err(|e| IoError::system(path, e))?;

    decode_buffer(buffer)
}

/// Write text to a file in `encoding`, replacing any previous content.
///
/// # Errors
/// `Unencodable` when `content` does not fit `encoding`, `System` when the
/// file cannot be written.
pub fn write_text<P: AsRef<Path>>(
    path: P,
    content: &str,
    encoding: TextEncoding,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let bytes = encoding.encode(content)?;
    std_fs::write(path, bytes).map_err(|e| IoError::system(path, e))
}

/// Copy a file byte for byte, replacing the destination.
///
/// # Errors
/// Returns `IoError::System` naming the source path on failure.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dest: Q) -> Result<(), IoError> {
    let src = src.as_ref();
    std_fs::copy(src, dest.as_ref())
        .map(|_| ())
        .map_err(|e| IoError::system(src, e))
}
