//! Literal-aware symbol renamer.
//!
//! Appends the run suffix to every whole-word occurrence of a declared
//! symbol. Each line is scanned once: quote characters split it into
//! alternating code and literal spans, and only code spans are rewritten, so
//! character literals never change.

use regex::{Captures, Regex, RegexBuilder};

use crate::error::EditError;
use crate::grammar::carries_literal;
use crate::normalize::QUOTE;
use crate::stage::{Stage, StageOutput};
use crate::symbols::SymbolTable;
use crate::types::SourceUnit;

/// Compiled size limit for the symbol alternation.
const PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Counters reported by the rename stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameStats {
    /// Units with at least one replacement.
    pub files_changed: usize,
    /// Total replacements.
    pub replacements: usize,
}

/// Whole-word renamer for one symbol table and suffix.
#[derive(Debug, Clone)]
pub struct Renamer {
    pattern: Option<Regex>,
    suffix: String,
}

impl Renamer {
    /// Compile the matcher for `symbols`.
    ///
    /// # Errors
    /// Returns `EditError::Pattern` if the alternation cannot be compiled.
    pub fn new(symbols: &SymbolTable, suffix: &str) -> Result<Self, EditError> {
        let pattern = if symbols.is_empty() {
            None
        } else {
            let mut names: Vec<&str> = symbols.iter().collect();
            names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            let alternation = names
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                .size_limit(PATTERN_SIZE_LIMIT)
                .build()
                .map_err(|e| EditError::Pattern(e.to_string()))?;
            Some(regex)
        };
        Ok(Self {
            pattern,
            suffix: suffix.to_string(),
        })
    }

    /// Rename symbols in one line; returns the new line and the number of
    /// replacements.
    #[must_use]
    pub fn rename_line(&self, line: &str) -> (String, usize) {
        let (out, count, _) = self.rename_from(line, false);
        (out, count)
    }

    /// Rename symbols in `line`, which starts inside a literal when
    /// `literal_open`. Also returns whether a literal is open at its end.
    fn rename_from(&self, line: &str, literal_open: bool) -> (String, usize, bool) {
        let quotes = line.matches(QUOTE).count();
        let literal_at_end = literal_open ^ (quotes % 2 == 1);
        let Some(pattern) = &self.pattern else {
            return (line.to_string(), 0, literal_at_end);
        };

        let mut count = 0;
        let mut out = String::with_capacity(line.len() + self.suffix.len());
        for (index, span) in line.split(QUOTE).enumerate() {
            if index > 0 {
                out.push(QUOTE);
            }
            if literal_open ^ (index % 2 == 1) {
                out.push_str(span);
                continue;
            }
            let renamed = pattern.replace_all(span, |caps: &Captures<'_>| {
                count += 1;
                format!("{}{}", &caps[0], self.suffix)
            });
            out.push_str(&renamed);
        }
        (out, count, literal_at_end)
    }

    /// Rename symbols in every line of a unit. A literal left open at the
    /// end of a line stays open on the following continuation lines.
    #[must_use]
    pub fn rename_unit(&self, unit: &SourceUnit) -> (SourceUnit, usize) {
        let mut total = 0;
        let mut literal_open = false;
        let lines = unit
            .lines
            .iter()
            .map(|line| {
                let start = carries_literal(literal_open, line);
                let (line, count, open) = self.rename_from(line, start);
                literal_open = open;
                total += count;
                line
            })
            .collect();
        (unit.with_lines(lines), total)
    }
}

/// Stage wrapper around [`Renamer::rename_unit`].
pub struct RenameStage {
    renamer: Renamer,
}

impl RenameStage {
    /// Create the stage from a compiled renamer.
    #[must_use]
    pub fn new(renamer: Renamer) -> Self {
        Self { renamer }
    }
}

impl Stage for RenameStage {
    type Report = RenameStats;

    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, units: &[SourceUnit]) -> Result<StageOutput<RenameStats>, EditError> {
        let mut stats = RenameStats::default();
        let units = units
            .iter()
            .map(|unit| {
                let (renamed, count) = self.renamer.rename_unit(unit);
                if count > 0 {
                    stats.files_changed += 1;
                    stats.replacements += count;
                }
                renamed
            })
            .collect();
        Ok(StageOutput {
            units,
            report: stats,
        })
    }
}
