// Steam app-id extraction from the game-detail payload
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static STEAM_APP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)store\.steampowered\.com/app/(\d+)").expect("steam url pattern is valid")
});

/// First capture of `pattern` in `text`, if any.
pub fn extract_pattern(text: &str, pattern: &Regex) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].to_string())
}

/// Scans the detail payload for a Steam store link and returns the app id.
///
/// Order: each entry of the `stores` collection (`url` directly or nested
/// under `store.url`), then the serialized payload as a whole. Any missing
/// or misshapen field degrades to "not found"; this never fails.
pub fn steam_app_id(payload: &Value) -> Option<String> {
    let stores = payload
        .get("stores")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for entry in stores {
        let url = entry
            .get("url")
            .or_else(|| entry.get("store").and_then(|s| s.get("url")))
            .and_then(Value::as_str)
            .unwrap_or("");
        if let Some(id) = extract_pattern(url, &STEAM_APP_RE) {
            return Some(id);
        }
    }

    // Some payload revisions bury the link elsewhere; scan everything.
    extract_pattern(&payload.to_string(), &STEAM_APP_RE)
}
