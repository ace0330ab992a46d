//! INCLUDE directive rewriter.
//!
//! Renamed files must still be found by the directives that pull them in:
//! composition-unit extensions become declaration-only extensions and the
//! included name gets the run prefix.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::RelinkConfig;

/// Statement-column INCLUDE directive.
const INCLUDE_STATEMENT: &str = "      INCLUDE";

static INCLUDED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( {6}INCLUDE[ \t]*')([^']*)'")
        .unwrap_or_else(|err| panic!("invalid INCLUDED_NAME regex: {err}"))
});

/// Rewrite an INCLUDE directive line; any other line is returned unchanged.
///
/// The directive is uppercased as a whole (including the quoted file name),
/// a composition extension is retargeted to the declaration extension and the
/// run prefix is prepended unless already present.
#[must_use]
pub fn rewrite_include<'a>(line: &'a str, config: &RelinkConfig) -> Cow<'a, str> {
    if !line.starts_with(INCLUDE_STATEMENT) {
        return Cow::Borrowed(line);
    }

    let upper = line.to_ascii_uppercase();
    let Some(caps) = INCLUDED_NAME.captures(&upper) else {
        return Cow::Owned(upper);
    };
    let (Some(head), Some(name)) = (caps.get(1), caps.get(2)) else {
        return Cow::Owned(upper);
    };

    let mut included = retarget_extension(name.as_str(), config);
    if !included.starts_with(&config.prefix) {
        included.insert_str(0, &config.prefix);
    }

    Cow::Owned(format!(
        "{}{}{}",
        head.as_str(),
        included,
        &upper[name.end()..]
    ))
}

fn retarget_extension(name: &str, config: &RelinkConfig) -> String {
    let composition = format!(".{}", config.composition_extension);
    match name.strip_suffix(&composition) {
        Some(stem) => format!("{stem}.{}", config.declaration_extension),
        None => name.to_string(),
    }
}
