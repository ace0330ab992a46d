#![allow(clippy::doc_markdown)]

//! relink-edit - Relinkable, thread-private rewrites of legacy fixed-form sources
//!
//! Rewrites a directory of FORTRAN 77 style sources so that several
//! independently built copies of the same library can be linked into one
//! process, and so that every named COMMON block becomes thread-private with
//! a runtime-computable address range.
//!
//! # Pipeline
//!
//! ```text
//! step_0  materialize   copy *.FOR / *.INC, prefix file names
//! step_1  normalize     uppercase outside literals, strip comments, fix INCLUDEs
//! step_2  privatize     START_/END_ sentinels + THREADPRIVATE per COMMON block
//!         list symbols  SUBROUTINE / FUNCTION / BLOCK DATA / COMMON names
//! step_3  rename        whole-word suffixing outside quoted literals
//! dest    save          copy final snapshot, apply patch, emit glue source
//! ```
//!
//! # Architecture
//!
//! ```text
//! relink-edit/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # EditError enum (thiserror)
//! ├── types.rs      # SourceUnit, RelinkConfig, PatchConfig
//! ├── normalize.rs  # Line normalizer
//! ├── include.rs    # INCLUDE directive rewriter
//! ├── grammar.rs    # Declaration line classifiers
//! ├── privatize.rs  # COMMON block privatizer (state machine)
//! ├── symbols.rs    # Corpus-wide symbol table
//! ├── rename.rs     # Literal-aware symbol renamer
//! ├── glue.rs       # Thread-private layout glue generator
//! ├── stage.rs      # Stage trait and snapshot sequencer
//! ├── patch.rs      # External patch application
//! ├── diff.rs       # Stage diff utilities
//! └── pipeline.rs   # End-to-end driver
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use relink_edit::{PipelineOptions, RelinkConfig, RelinkPipeline};
//!
//! let pipeline = RelinkPipeline::new(RelinkConfig::default());
//! let report = pipeline.run(&PipelineOptions::new("src", "work", "dest"))?;
//! println!("{} COMMON blocks privatized", report.blocks.len());
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod diff;
mod error;
mod glue;
mod grammar;
mod include;
mod normalize;
mod patch;
mod pipeline;
mod privatize;
mod rename;
mod stage;
mod symbols;
mod types;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::EditError;
pub use relink_io::TextEncoding;
pub use types::{PatchConfig, RelinkConfig, SourceUnit};

pub use grammar::{CommonDeclaration, Declaration, DeclarationKind, classify_declaration};
pub use include::rewrite_include;
pub use normalize::{NormalizeStage, normalize_line, normalize_unit};
pub use privatize::{BlockState, CommonRegistry, PrivatizeStage, Transition, privatize_unit};
pub use rename::{RenameStage, RenameStats, Renamer};
pub use symbols::{SymbolTable, extract_symbols};

pub use glue::{GlueGenerator, thread_num_function};
pub use patch::PatchApplier;
pub use pipeline::{PipelineOptions, RelinkPipeline, RunReport};
pub use stage::{Stage, StageOutput, StageSequencer, StageTiming, materialized_name};

// Re-export diff utility for external use
pub use diff::{changed_line_count, generate_unified_diff};
