//! Diff utilities for stage tracing.
//!
//! Uses the `similar` crate for line-by-line diffing.

use similar::{ChangeTag, TextDiff};

/// Unified diff of one unit between two snapshots, with `a/` and `b/`
/// headers so it can be fed back to `patch -p1`.
#[must_use]
pub fn generate_unified_diff(name: &str, original: &str, modified: &str) -> String {
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

/// Number of inserted plus deleted lines between two texts.
#[must_use]
pub fn changed_line_count(original: &str, modified: &str) -> usize {
    TextDiff::from_lines(original, modified)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_diff() {
        let original = "      CALL BAR(X)\n      END\n";
        let modified = "      CALL BAR_RP9(X)\n      END\n";
        let diff = generate_unified_diff("RP9_CORE.FOR", original, modified);

        assert!(diff.contains("--- a/RP9_CORE.FOR"));
        assert!(diff.contains("+++ b/RP9_CORE.FOR"));
        assert!(diff.contains("-      CALL BAR(X)"));
        assert!(diff.contains("+      CALL BAR_RP9(X)"));
    }

    #[test]
    fn test_no_changes() {
        let content = "      END\n";
        assert_eq!(changed_line_count(content, content), 0);
    }

    #[test]
    fn test_replaced_line_counts_twice() {
        assert_eq!(changed_line_count("a\nb\n", "a\nc\n"), 2);
    }
}
