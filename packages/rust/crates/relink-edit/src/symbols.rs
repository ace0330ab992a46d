//! Corpus-wide symbol table.
//!
//! Collects every routine, function, BLOCK DATA unit and COMMON block name
//! declared anywhere in a normalized snapshot. A name declared in several
//! files is one symbol.

use std::collections::BTreeSet;

use crate::grammar::classify_declaration;
use crate::types::SourceUnit;

/// Set of declared names eligible for renaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeSet<String>,
}

impl SymbolTable {
    /// Add a symbol; returns `false` if it was already present.
    pub fn insert(&mut self, symbol: impl Into<String>) -> bool {
        self.symbols.insert(symbol.into())
    }

    /// Whether `symbol` was declared.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no symbol was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Union of two tables.
    #[must_use]
    pub fn merge(mut self, other: SymbolTable) -> Self {
        self.symbols.extend(other.symbols);
        self
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn unit_symbols(unit: &SourceUnit) -> SymbolTable {
    unit.lines
        .iter()
        .filter_map(|line| classify_declaration(line))
        .inspect(|decl| {
            tracing::debug!(
                unit = %unit.name,
                kind = ?decl.kind,
                symbol = decl.name,
                "listed symbol"
            );
        })
        .map(|decl| decl.name)
        .collect()
}

/// Build the symbol table of a normalized snapshot.
#[must_use]
pub fn extract_symbols(units: &[SourceUnit]) -> SymbolTable {
    units
        .iter()
        .map(unit_symbols)
        .fold(SymbolTable::default(), SymbolTable::merge)
}
