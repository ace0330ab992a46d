//! Binary detection and source decoding.
//!
//! Legacy sources predate UTF-8: comments and character literals routinely
//! carry Latin-1 bytes. Such files are decoded one byte per character and
//! remember their encoding so they can be written back byte for byte.

use std::borrow::Cow;

use memchr::memchr;

use crate::error::IoError;

/// Quick binary detection - checks first 8KB for NULL bytes.
///
/// Files containing NULL bytes in the first 8KB are considered binary.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    let check_len = std::cmp::min(buffer.len(), 8192);
    memchr(0, &buffer[..check_len]).is_some()
}

/// On-disk encoding of a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// Valid UTF-8 (including plain ASCII).
    #[default]
    Utf8,
    /// Anything else, read as ISO-8859-1.
    Latin1,
}

impl TextEncoding {
    /// Encode `text` back into this encoding.
    ///
    /// # Errors
    /// `IoError::Unencodable` when a character has no Latin-1 byte.
    pub fn encode(self, text: &str) -> Result<Cow<'_, [u8]>, IoError> {
        match self {
            Self::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| IoError::Unencodable(c)))
                .collect::<Result<Vec<u8>, _>>()
                .map(Cow::Owned),
        }
    }
}

/// Decoded file content and the encoding it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// File content.
    pub text: String,
    /// Encoding to write the content back with.
    pub encoding: TextEncoding,
}

/// Decode bytes as UTF-8, falling back to Latin-1.
///
/// The fallback maps every byte to the character with the same code point,
/// so no byte is ever lost.
///
/// # Errors
/// Returns `IoError::BinaryFile` when binary content is detected.
pub fn decode_buffer(buffer: Vec<u8>) -> Result<DecodedText, IoError> {
    if is_binary(&buffer) {
        return Err(IoError::BinaryFile);
    }

    match String::from_utf8(buffer) {
        Ok(text) => Ok(DecodedText {
            text,
            encoding: TextEncoding::Utf8,
        }),
        Err(e) => {
            tracing::debug!("source is not UTF-8, decoding as Latin-1");
            Ok(DecodedText {
                text: e.into_bytes().into_iter().map(char::from).collect(),
                encoding: TextEncoding::Latin1,
            })
        }
    }
}
