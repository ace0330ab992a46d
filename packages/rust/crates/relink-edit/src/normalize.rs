//! Line normalizer.
//!
//! Canonicalizes case and strips comments while leaving quoted literals
//! untouched. The function is total: an unbalanced quote simply keeps the
//! rest of the line literal.

use crate::error::EditError;
use crate::grammar::carries_literal;
use crate::include::rewrite_include;
use crate::stage::{Stage, StageOutput};
use crate::types::{RelinkConfig, SourceUnit};

/// Delimiter of character literals.
pub(crate) const QUOTE: char = '\'';

/// Starts an inline comment outside literals.
const INLINE_COMMENT: char = '!';

/// Normalize one raw line.
///
/// Returns `None` for a full-line comment (first character in
/// `comment_markers`), which drops the line from the unit. Otherwise the
/// line is uppercased outside quoted literals and truncated at the first
/// unquoted `!`.
///
/// Normalizing an already-normalized line is a no-op.
#[must_use]
pub fn normalize_line(line: &str, comment_markers: &str) -> Option<String> {
    normalize_from(line, comment_markers, false).map(|(out, _)| out)
}

/// Normalize `line` starting inside a literal when `literal_open`; also
/// returns whether a literal is still open at the end of the line.
fn normalize_from(line: &str, comment_markers: &str, literal_open: bool) -> Option<(String, bool)> {
    if line
        .chars()
        .next()
        .is_some_and(|first| comment_markers.contains(first))
    {
        return None;
    }

    let mut out = String::with_capacity(line.len());
    let mut in_literal = literal_open;
    for c in line.chars() {
        if c == QUOTE {
            in_literal = !in_literal;
        }
        if in_literal {
            out.push(c);
            continue;
        }
        if c == INLINE_COMMENT {
            break;
        }
        out.push(c.to_ascii_uppercase());
    }
    Some((out, in_literal))
}

/// Normalize every line of a unit and retarget its INCLUDE directives.
///
/// A literal left open at the end of a line stays open on the following
/// continuation lines, so continued literal text is preserved too.
#[must_use]
pub fn normalize_unit(unit: &SourceUnit, config: &RelinkConfig) -> SourceUnit {
    let mut literal_open = false;
    let mut lines = Vec::with_capacity(unit.lines.len());
    for line in &unit.lines {
        let start = carries_literal(literal_open, line);
        let Some((normalized, open)) = normalize_from(line, &config.comment_markers, start) else {
            continue;
        };
        literal_open = open;
        lines.push(rewrite_include(&normalized, config).into_owned());
    }
    unit.with_lines(lines)
}

/// Stage wrapper around [`normalize_unit`].
pub struct NormalizeStage<'a> {
    config: &'a RelinkConfig,
}

impl<'a> NormalizeStage<'a> {
    /// Create the stage for a run configuration.
    #[must_use]
    pub fn new(config: &'a RelinkConfig) -> Self {
        Self { config }
    }
}

impl Stage for NormalizeStage<'_> {
    type Report = ();

    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, units: &[SourceUnit]) -> Result<StageOutput<()>, EditError> {
        let units = units
            .iter()
            .map(|unit| normalize_unit(unit, self.config))
            .collect();
        Ok(StageOutput { units, report: () })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: &str = "Cc!";

    #[test]
    fn test_comment_lines_dropped() {
        assert_eq!(normalize_line("C     comment", MARKERS), None);
        assert_eq!(normalize_line("c     comment", MARKERS), None);
        assert_eq!(normalize_line("! free comment", MARKERS), None);
    }

    #[test]
    fn test_uppercase_outside_literals() {
        assert_eq!(
            normalize_line("      print *, 'call bar now'", MARKERS).unwrap(),
            "      PRINT *, 'call bar now'"
        );
    }

    #[test]
    fn test_inline_comment_truncates() {
        assert_eq!(
            normalize_line("      x = 1 ! set x", MARKERS).unwrap(),
            "      X = 1 "
        );
    }

    #[test]
    fn test_bang_inside_literal_kept() {
        assert_eq!(
            normalize_line("      s = 'hi!' ! greet", MARKERS).unwrap(),
            "      S = 'hi!' "
        );
    }

    #[test]
    fn test_unbalanced_quote_stays_literal() {
        assert_eq!(
            normalize_line("      s = 'abc ! def", MARKERS).unwrap(),
            "      S = 'abc ! def"
        );
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(
            normalize_line("      s = 'don''t' // t", MARKERS).unwrap(),
            "      S = 'don''t' // T"
        );
    }

    #[test]
    fn test_empty_line_passes_through() {
        assert_eq!(normalize_line("", MARKERS).unwrap(), "");
    }
}
