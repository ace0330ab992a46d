//! Declaration line classifiers.
//!
//! Each classifier recognizes one declaration form on a normalized
//! (uppercased) line and captures a bare identifier. [`classify_declaration`]
//! tries them in a fixed order and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*BLOCK[ \t]*DATA[ \t]*([A-Z0-9_]+)")
        .unwrap_or_else(|err| panic!("invalid BLOCK_DATA regex: {err}"))
});

static SUBROUTINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*SUBROUTINE[ \t]*([A-Z0-9_]+)")
        .unwrap_or_else(|err| panic!("invalid SUBROUTINE regex: {err}"))
});

/// Untyped `FUNCTION NAME`, or a typed `<type> FUNCTION NAME(`; the typed
/// form needs the argument list so `INTEGER FUNCTIONS` stays a variable.
static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[ \t]*(?:FUNCTION[ \t]*([A-Z0-9_]+)",
        r"|(?:INTEGER|REAL|LOGICAL|COMPLEX|DOUBLE[ \t]*PRECISION|DOUBLE[ \t]*COMPLEX|CHARACTER)",
        r"(?:[ \t]*\*[ \t]*(?:[0-9]+|\([ \t]*\*[ \t]*\)))?",
        r"[ \t]*FUNCTION[ \t]*([A-Z0-9_]+)[ \t]*\()"
    ))
    .unwrap_or_else(|err| panic!("invalid FUNCTION regex: {err}"))
});

static COMMON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*COMMON[ \t]*/[ \t]*([A-Z0-9_]+)[ \t]*/")
        .unwrap_or_else(|err| panic!("invalid COMMON regex: {err}"))
});

/// Kind of a declared, renameable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    /// `BLOCK DATA NAME`
    BlockData,
    /// `SUBROUTINE NAME`
    Subroutine,
    /// `[type] FUNCTION NAME`
    Function,
    /// `COMMON /NAME/`
    Common,
}

/// A declaration recognized on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    /// What was declared.
    pub kind: DeclarationKind,
    /// Declared identifier.
    pub name: &'a str,
}

/// A named COMMON declaration with the position where its member list starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonDeclaration<'a> {
    /// Block name.
    pub name: &'a str,
    /// Byte offset just past the closing `/` of the block name.
    pub members_at: usize,
}

/// Line classifier: captures the declared identifier, if any.
type Classifier = fn(&str) -> Option<&str>;

/// Attempt order is the tie-break policy between overlapping forms.
const CLASSIFIERS: [(DeclarationKind, Classifier); 4] = [
    (DeclarationKind::BlockData, block_data),
    (DeclarationKind::Subroutine, subroutine),
    (DeclarationKind::Function, function),
    (DeclarationKind::Common, common_name),
];

/// Classify a normalized line. Attempts are ordered: BLOCK DATA, SUBROUTINE,
/// FUNCTION, COMMON; a line declares at most one symbol.
#[must_use]
pub fn classify_declaration(line: &str) -> Option<Declaration<'_>> {
    CLASSIFIERS.iter().find_map(|(kind, classify)| {
        classify(line).map(|name| Declaration { kind: *kind, name })
    })
}

fn block_data(line: &str) -> Option<&str> {
    BLOCK_DATA
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn subroutine(line: &str) -> Option<&str> {
    SUBROUTINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn function(line: &str) -> Option<&str> {
    FUNCTION
        .captures(line)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
}

fn common_name(line: &str) -> Option<&str> {
    common_declaration(line).map(|decl| decl.name)
}

/// Recognize a named COMMON declaration. Blank COMMON (`COMMON //`) has no
/// name and is not matched.
#[must_use]
pub fn common_declaration(line: &str) -> Option<CommonDeclaration<'_>> {
    let caps = COMMON.captures(line)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?;
    Some(CommonDeclaration {
        name: name.as_str(),
        members_at: whole.end(),
    })
}

/// Fixed-form continuation: columns 1-5 blank or a label, column 6 neither
/// blank nor `0`.
pub(crate) fn is_continuation(line: &str) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < 6 {
        return false;
    }
    let label_ok = bytes[..5]
        .iter()
        .all(|b| *b == b' ' || b.is_ascii_digit());
    label_ok && bytes[5] != b' ' && bytes[5] != b'0'
}

/// Whether a character literal left open at the end of the previous line is
/// still open at the start of `line`. Only continuation lines and blank
/// lines carry it; any other line starts a new statement.
pub(crate) fn carries_literal(literal_open: bool, line: &str) -> bool {
    literal_open && (is_continuation(line) || line.trim().is_empty())
}
