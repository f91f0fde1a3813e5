// Title normalization shared by the filter steps
use regex::Regex;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("year pattern is valid"));

/// Lowercases, drops everything outside `[a-z0-9]` and whitespace, and
/// collapses whitespace runs to single spaces.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts a parenthesized 4-digit year suffix, e.g. "Game (2013)" → "2013".
pub fn extract_year(title: &str) -> Option<String> {
    YEAR_RE
        .captures(title)
        .map(|caps| caps[1].to_string())
}

/// Removes the first parenthesized year from a title, trimming the rest.
pub fn strip_year(title: &str) -> String {
    YEAR_RE.replace(title, "").trim().to_string()
}
