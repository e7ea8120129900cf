//! Normalisation for delimited narrative cells.
//!
//! SSP exports pack lists into a single cell, separated by `;` or `|`,
//! and templates leave placeholder tokens behind where a bullet was never
//! filled in. Everything that renders or joins on these cells goes through
//! [`parse_delimited`] first.
//!
//! # Rules
//!
//! 1. `|` is treated as `;`, then the text is split on `;`
//! 2. Each item is trimmed; empty items and placeholder tokens are dropped
//! 3. One trailing period is stripped from each surviving item; an item
//!    left empty by that (a lone `.`) is dropped

/// Template placeholders that never carry content. Compared case-sensitively.
pub const PLACEHOLDERS: &[&str] = &["header", "bullet_1", "bullet_2", "bullet1", "bullet2"];

/// Title used when a control row has no control text.
pub const UNTITLED: &str = "Untitled Control";

/// Split a delimited cell into ordered, trimmed, non-empty items.
///
/// Never fails: `None` and blank input produce an empty vector.
pub fn parse_delimited(content: Option<&str>) -> Vec<String> {
    let Some(content) = content else {
        return Vec::new();
    };

    content
        .replace('|', ";")
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty() && !PLACEHOLDERS.contains(item))
        .map(strip_trailing_period)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Human-readable control title from the raw `Control` cell.
///
/// Delimited items are joined with `", "`. A trailing period is removed.
pub fn control_title(control_text: Option<&str>) -> String {
    let Some(text) = control_text.filter(|t| !t.trim().is_empty()) else {
        return UNTITLED.to_string();
    };

    let items = parse_delimited(Some(text));
    let joined = if items.is_empty() {
        text.to_string()
    } else {
        items.join(", ")
    };
    match joined.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => joined,
    }
}

fn strip_trailing_period(item: &str) -> &str {
    match item.strip_suffix('.') {
        Some(stripped) => stripped.trim(),
        None => item,
    }
}
