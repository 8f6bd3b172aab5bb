//! Text canonicalization shared by every matcher.
//!
//! Handles:
//! - Accent stripping (NFD decomposition, combining marks dropped)
//! - Case folding (upper for keyword matching, lower for header checks)
//! - Whitespace collapsing
//! - Name cleanup and RUT formatting

mod rut;

pub use rut::*;

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Parenthetical annotations appended to names by the portal, ASCII or fullwidth.
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(][^）)]*[）)]").expect("valid parenthetical regex"));

/// Markers that spreadsheets and dataframes leave behind in blank cells.
const EMPTY_MARKERS: [&str; 4] = ["", "nan", "none", "null"];

/// Canonicalize text for keyword matching: no accents, upper-case, single spaces.
///
/// `normalize(normalize(x)) == normalize(x)` for all inputs.
pub fn normalize(text: &str) -> String {
    fold(&text.to_uppercase())
}

/// Same as [`normalize`] but lower-cased, for header and field-name checks.
pub fn normalize_simple(text: &str) -> String {
    fold(&text.to_lowercase())
}

/// Strip parenthetical annotations from a patient name and collapse whitespace.
pub fn clean_name(name: &str) -> String {
    collapse_whitespace(&PARENTHETICAL.replace_all(name, ""))
}

/// Check whether a text value counts as empty.
///
/// Trimmed, lower-cased `""`, `"nan"`, `"none"` and `"null"` are all empty.
pub fn is_empty_text(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    EMPTY_MARKERS.contains(&lower.as_str())
}

fn fold(cased: &str) -> String {
    let stripped: String = cased.nfd().filter(|c| !is_combining_mark(*c)).collect();
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
