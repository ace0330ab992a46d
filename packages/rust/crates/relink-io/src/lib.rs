#![allow(clippy::doc_markdown)]

//! relink-io - Safe file I/O for the relink pipeline
//!
//! Reads legacy source files defensively and manages the snapshot
//! directories that every pipeline stage reads from and writes to.
//!
//! # Features
//!
//! - **Safety**: Binary detection & Size limits
//! - **Legacy input**: Latin-1 fallback that round-trips every byte
//! - **Snapshots**: Flat directory listing, writing and cleanup helpers
//!
//! # Architecture
//!
//! ```text
//! relink-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError enum
//! ├── detect.rs   # Binary detection & encodings
//! ├── sync.rs     # Text read/write API
//! └── dirs.rs     # Snapshot directory helpers
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use relink_io::{list_files, read_text_safe, write_text};
//!
//! for path in list_files("src/fortran", &["FOR", "INC"])? {
//!     let decoded = read_text_safe(&path, 4 * 1024 * 1024)?;
//!     write_text(&path, &decoded.text, decoded.encoding)?;
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod detect;
mod dirs;
mod error;
mod sync;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use dirs::{copy_files_into, ensure_dir, list_files, remove_dir};
pub use error::IoError;
pub use sync::{copy_file, read_text_safe, write_text};

// Decoding utilities; the encoding types travel with every read
pub use detect::{DecodedText, TextEncoding, decode_buffer, is_binary};

/// Default size limit for a single legacy source file (4MB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 4 * 1024 * 1024;
