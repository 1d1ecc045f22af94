//! Canonical key derivation for identity matching and prefix search.
//!
//! Every write path that stores a search field and every read path that
//! matches against one goes through [`normalize`]. Identity
//! deduplication and prefix search are only correct because both sides
//! derive their keys with this one function.

/// Highest valid Unicode scalar value, appended to a normalized key to
/// form the exclusive upper bound of a prefix range scan.
pub const PREFIX_SENTINEL: char = '\u{10FFFF}';

/// Normalize a display string into its canonical lookup key.
///
/// Trims leading/trailing whitespace and applies simple lowercase
/// folding. Pure and total: never fails, empty input maps to the empty
/// key.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Exclusive upper bound for a prefix range `[key, upper)`.
///
/// Any string starting with `key` sorts below `key` followed by the
/// maximum code point, so `search_field >= key AND search_field < upper`
/// selects exactly the prefix matches.
pub fn prefix_upper_bound(key: &str) -> String {
    let mut upper = String::with_capacity(key.len() + PREFIX_SENTINEL.len_utf8());
    upper.push_str(key);
    upper.push(PREFIX_SENTINEL);
    upper
}
