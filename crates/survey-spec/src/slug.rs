use std::sync::LazyLock;

use regex::Regex;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("separator pattern is valid"));

/// Derives the URL-friendly identifier of a section title.
///
/// The title is lowercased, every run of characters outside `[a-z0-9]` becomes a
/// single `-`, and separators at either end are dropped.
pub fn section_id(title: &str) -> String {
    let lowered = title.to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
