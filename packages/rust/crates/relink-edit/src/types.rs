//! Core types for the rewrite pipeline.
//!
//! Defines the source unit model and the run configuration.

use std::path::{Path, PathBuf};

use relink_io::TextEncoding;
use serde::Deserialize;

/// One file at one pipeline stage.
///
/// Units are never mutated once materialized: a stage builds new units from
/// the previous snapshot's units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// File name relative to its snapshot directory.
    pub name: String,
    /// Text lines, without line terminators.
    pub lines: Vec<String>,
    /// Snapshot directory the unit was read from.
    pub origin: PathBuf,
    /// Encoding the unit is written back with.
    pub encoding: TextEncoding,
}

impl SourceUnit {
    /// Create a unit from already-split lines.
    pub fn new(name: impl Into<String>, lines: Vec<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            lines,
            origin: origin.into(),
            encoding: TextEncoding::Utf8,
        }
    }

    /// Same unit, written back with `encoding`.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Create a unit from file text. `\n` and `\r\n` terminators are accepted.
    pub fn from_text(name: impl Into<String>, text: &str, origin: impl Into<PathBuf>) -> Self {
        Self::new(name, text.lines().map(str::to_string).collect(), origin)
    }

    /// Successor unit: same name, origin and encoding, new lines.
    #[must_use]
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            name: self.name.clone(),
            lines,
            origin: self.origin.clone(),
            encoding: self.encoding,
        }
    }

    /// File text, every line terminated by `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// File extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|ext| ext.to_str())
    }

    /// Whether this unit only carries declarations (is pulled in by INCLUDE).
    #[must_use]
    pub fn is_declaration_only(&self, config: &RelinkConfig) -> bool {
        self.extension() == Some(config.declaration_extension.as_str())
    }
}

/// Patch application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Unified diff applied to the destination tree; `None` skips patching.
    pub file: Option<PathBuf>,
    /// Patch utility.
    pub program: String,
    /// Leading path components stripped from patch file names (`-p`).
    pub strip: u32,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            file: None,
            program: "patch".to_string(),
            strip: 1,
        }
    }
}

/// Configuration for a rewrite run.
///
/// Every fixed string the pipeline writes or matches lives here, so a second
/// library build only needs a different prefix/suffix pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelinkConfig {
    /// Prepended to every file name and INCLUDEd file name.
    pub prefix: String,
    /// Appended to every declared symbol and to the glue routine names.
    pub suffix: String,
    /// Extensions copied from the source directory.
    pub source_extensions: Vec<String>,
    /// Extension of compiled composition units.
    pub composition_extension: String,
    /// Extension of declaration-only (INCLUDE) units.
    pub declaration_extension: String,
    /// Source file name endings converted to declaration-only units.
    pub declaration_units: Vec<String>,
    /// Include directives whose file name contains this marker come first.
    pub commons_marker: String,
    /// Column-1 characters that make a line a comment.
    pub comment_markers: String,
    /// Glue file is named `<prefix><glue_marker>.<composition_extension>`.
    pub glue_marker: String,
    /// Maximum size of a single source file in bytes.
    pub max_file_size: u64,
    /// Patch application settings.
    pub patch: PatchConfig,
}

impl Default for RelinkConfig {
    fn default() -> Self {
        Self {
            prefix: "RP9_".to_string(),
            suffix: "_RP9".to_string(),
            source_extensions: vec!["FOR".to_string(), "INC".to_string()],
            composition_extension: "FOR".to_string(),
            declaration_extension: "INC".to_string(),
            declaration_units: vec!["COMMONS.FOR".to_string(), "COMTRN.FOR".to_string()],
            commons_marker: "COMMONS".to_string(),
            comment_markers: "Cc!".to_string(),
            glue_marker: "XCOMMONS".to_string(),
            max_file_size: relink_io::DEFAULT_MAX_FILE_BYTES,
            patch: PatchConfig::default(),
        }
    }
}

impl RelinkConfig {
    /// File name of the generated glue source.
    #[must_use]
    pub fn glue_file_name(&self) -> String {
        format!(
            "{}{}.{}",
            self.prefix, self.glue_marker, self.composition_extension
        )
    }
}
