// Description cleanup and the progressive reveal pager
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("url pattern is valid"));
static WWW_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)www\.\S+").expect("www pattern is valid"));
static STEAM_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)store\.steampowered\.com\S+").expect("steam pattern is valid")
});
static BARE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\S+\.com/\S+").expect("bare link pattern is valid"));

const MIN_CLEAN_LEN: usize = 20;
const MIN_FALLBACK_LEN: usize = 10;

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops markup and keeps the text content, whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let text: String = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&text)
}

fn remove_urls(text: &str) -> String {
    let mut out = HTTP_URL_RE.replace_all(text, " ").into_owned();
    out = WWW_URL_RE.replace_all(&out, " ").into_owned();
    out = STEAM_URL_RE.replace_all(&out, " ").into_owned();
    out = BARE_LINK_RE.replace_all(&out, " ").into_owned();
    collapse_whitespace(&out)
}

/// Turns a raw catalog description (often HTML peppered with store links)
/// into readable text. Returns an empty string when nothing meaningful
/// survives the cleanup.
pub fn clean_description(raw: &str) -> String {
    let text = strip_html(raw);
    let without_urls = remove_urls(&text);
    if without_urls.len() > MIN_CLEAN_LEN {
        return without_urls;
    }
    // Mostly-link descriptions: keep whatever readable fragments remain.
    let short = collapse_whitespace(&HTTP_URL_RE.replace_all(&text, ""));
    if short.len() > MIN_FALLBACK_LEN {
        short
    } else {
        String::new()
    }
}

const REVEAL_CAPS: [usize; 3] = [200, 400, 800];

/// Four-level progressive reveal for long descriptions: 200, 400, 800
/// characters, then the full text. Toggling past the last level wraps back
/// to the first.
#[derive(Debug, Default)]
pub struct DescriptionPager {
    level: usize,
}

impl DescriptionPager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Renders `text` at the current level, appending an ellipsis when
    /// truncated. The final level never truncates.
    pub fn render(&self, text: &str) -> String {
        if text.is_empty() {
            return "No description available".to_string();
        }
        if let Some(&cap) = REVEAL_CAPS.get(self.level) {
            if text.chars().count() > cap {
                let truncated: String = text.chars().take(cap).collect();
                return format!("{}...", truncated);
            }
        }
        text.to_string()
    }

    /// Advances to the next level; wraps to the first after the full-text
    /// level, and stays there for texts that fit the first cap anyway.
    pub fn toggle(&mut self, text: &str) {
        if self.level == REVEAL_CAPS.len() || text.chars().count() <= REVEAL_CAPS[0] {
            self.level = 0;
        } else {
            self.level += 1;
        }
    }
}
