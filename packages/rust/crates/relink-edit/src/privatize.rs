//! COMMON block privatizer.
//!
//! Every named COMMON block becomes thread-private and is bracketed by two
//! sentinel variables, `START_<NAME>` first and `END_<NAME>` last, so glue
//! code can compute each block's per-thread base address and byte extent.
//!
//! Each unit is streamed through a two-state machine ([`BlockState`]); the
//! discovered blocks are returned as a [`CommonRegistry`] value and folded
//! across the unit set.

use std::collections::BTreeSet;

use crate::error::EditError;
use crate::grammar::{common_declaration, is_continuation};
use crate::stage::{Stage, StageOutput};
use crate::types::{RelinkConfig, SourceUnit};

/// Statement lines start in column 7.
const STATEMENT_INDENT: &str = "      ";

/// Column 1-5 blank and column 6 set: a continuation line.
const CONTINUATION_INDENT: &str = "     & ";

/// Name of the sentinel occupying the lowest offset of a block.
#[must_use]
pub fn start_sentinel(block: &str) -> String {
    format!("START_{block}")
}

/// Name of the one-byte sentinel closing a block.
#[must_use]
pub fn end_sentinel(block: &str) -> String {
    format!("END_{block}")
}

/// A COMMON declaration whose member list is still open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    name: String,
}

impl OpenBlock {
    /// Lines that end the member list and make the block thread-private.
    fn close(&self) -> Vec<String> {
        vec![
            format!("{CONTINUATION_INDENT}, {}", end_sentinel(&self.name)),
            format!("C$OMP THREADPRIVATE(/{}/)", self.name),
            String::new(),
        ]
    }
}

/// Privatizer state between two lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Not inside a COMMON declaration.
    #[default]
    Outside,
    /// Inside the member list of a COMMON declaration.
    InsideBlock(OpenBlock),
}

/// Result of feeding one line to a [`BlockState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State for the next line.
    pub next: BlockState,
    /// Output lines, in order.
    pub emitted: Vec<String>,
    /// Block whose declaration started on this line.
    pub opened: Option<String>,
}

impl BlockState {
    /// Consume one normalized line.
    ///
    /// Inside a block, continuation lines and whitespace-only lines (blank
    /// comment lines in fixed form) keep the member list open; any other
    /// line closes it first.
    #[must_use]
    pub fn on_line(self, line: &str) -> Transition {
        let mut emitted = Vec::new();

        if let BlockState::InsideBlock(block) = self {
            if is_continuation(line) || line.trim().is_empty() {
                return Transition {
                    next: BlockState::InsideBlock(block),
                    emitted: vec![line.to_string()],
                    opened: None,
                };
            }
            emitted.extend(block.close());
        }

        let Some(decl) = line
            .starts_with(' ')
            .then(|| common_declaration(line))
            .flatten()
        else {
            emitted.push(line.to_string());
            return Transition {
                next: BlockState::Outside,
                emitted,
                opened: None,
            };
        };

        let name = decl.name.to_string();
        let start = start_sentinel(&name);
        emitted.push(format!("{STATEMENT_INDENT}DOUBLE PRECISION {start}"));
        emitted.push(format!("{STATEMENT_INDENT}CHARACTER*1 {}", end_sentinel(&name)));
        emitted.push(format!("{} {start},", &line[..decl.members_at]));
        emitted.push(format!(
            "{CONTINUATION_INDENT}{}",
            line[decl.members_at..].trim_start()
        ));

        Transition {
            next: BlockState::InsideBlock(OpenBlock { name: name.clone() }),
            emitted,
            opened: Some(name),
        }
    }

    /// Consume end-of-file: a block still open is closed exactly as if a
    /// non-continuation line had followed.
    #[must_use]
    pub fn on_end_of_file(self) -> Vec<String> {
        match self {
            BlockState::Outside => Vec::new(),
            BlockState::InsideBlock(block) => block.close(),
        }
    }
}

/// Blocks privatized during a run and the declaration-only units that
/// declare them.
///
/// Every privatized block is recorded, but only blocks declared in a
/// declaration-only unit are *shared*: their sentinels are in scope wherever
/// that unit is INCLUDEd, so only they can be described by the glue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonRegistry {
    blocks: BTreeSet<String>,
    shared: BTreeSet<String>,
    declaration_units: BTreeSet<String>,
}

impl CommonRegistry {
    /// Record a privatized block. When the declaring unit is
    /// declaration-only the block is shared and the unit is remembered.
    pub fn record(&mut self, block: &str, declaration_unit: Option<&str>) {
        self.blocks.insert(block.to_string());
        if let Some(unit) = declaration_unit {
            self.shared.insert(block.to_string());
            self.declaration_units.insert(unit.to_string());
        }
    }

    /// Union of two registries.
    #[must_use]
    pub fn merge(mut self, other: CommonRegistry) -> Self {
        self.blocks.extend(other.blocks);
        self.shared.extend(other.shared);
        self.declaration_units.extend(other.declaration_units);
        self
    }

    /// Every privatized block name, sorted.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    /// Number of distinct privatized blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks declared in a declaration-only unit, sorted.
    pub fn shared_blocks(&self) -> impl Iterator<Item = &str> {
        self.shared.iter().map(String::as_str)
    }

    /// Number of distinct shared blocks.
    #[must_use]
    pub fn shared_block_count(&self) -> usize {
        self.shared.len()
    }

    /// Declaration-only unit names, sorted.
    pub fn declaration_units(&self) -> impl Iterator<Item = &str> {
        self.declaration_units.iter().map(String::as_str)
    }

    /// INCLUDE directives for every declaration-only unit. Units whose name
    /// contains `marker` come first; each group is sorted by name.
    #[must_use]
    pub fn include_directives(&self, marker: &str) -> Vec<String> {
        let (marked, rest): (Vec<&str>, Vec<&str>) = self
            .declaration_units()
            .partition(|unit| unit.contains(marker));
        marked
            .into_iter()
            .chain(rest)
            .map(|unit| format!("{STATEMENT_INDENT}INCLUDE '{unit}'"))
            .collect()
    }
}

/// Privatize every COMMON block of one unit.
#[must_use]
pub fn privatize_unit(unit: &SourceUnit, config: &RelinkConfig) -> (SourceUnit, CommonRegistry) {
    let declaration_unit = unit
        .is_declaration_only(config)
        .then_some(unit.name.as_str());

    let mut registry = CommonRegistry::default();
    let mut lines = Vec::with_capacity(unit.lines.len());
    let mut state = BlockState::Outside;

    for line in &unit.lines {
        let transition = state.on_line(line);
        if let Some(block) = &transition.opened {
            tracing::debug!(unit = %unit.name, block = %block, "privatized COMMON block");
            registry.record(block, declaration_unit);
        }
        lines.extend(transition.emitted);
        state = transition.next;
    }
    lines.extend(state.on_end_of_file());

    (unit.with_lines(lines), registry)
}

/// Stage wrapper around [`privatize_unit`], reporting the folded registry.
pub struct PrivatizeStage<'a> {
    config: &'a RelinkConfig,
}

impl<'a> PrivatizeStage<'a> {
    /// Create the stage for a run configuration.
    #[must_use]
    pub fn new(config: &'a RelinkConfig) -> Self {
        Self { config }
    }
}

impl Stage for PrivatizeStage<'_> {
    type Report = CommonRegistry;

    fn name(&self) -> &'static str {
        "privatize"
    }

    fn apply(&self, units: &[SourceUnit]) -> Result<StageOutput<CommonRegistry>, EditError> {
        let (units, report) = units.iter().map(|unit| privatize_unit(unit, self.config)).fold(
            (Vec::with_capacity(units.len()), CommonRegistry::default()),
            |(mut units, registry), (unit, found)| {
                units.push(unit);
                (units, registry.merge(found))
            },
        );
        Ok(StageOutput { units, report })
    }
}
