use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

pub const SUMMARY_MAX_CHARS: usize = 300;
pub const WORDS_PER_MINUTE: usize = 200;
pub const MIN_READ_MINUTES: i64 = 2;
/// Read time reported for items without any body text.
pub const EMPTY_CONTENT_READ_MINUTES: i64 = 3;

static TRAILING_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[[^\]]*\]\s*$").unwrap());

/// Render an HTML fragment as plain text with collapsed whitespace.
/// Entities are decoded by the HTML parser.
pub fn html_to_text(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return collapse_whitespace(html);
    }
    let fragment = Html::parse_fragment(html);
    let text: Vec<&str> = fragment.root_element().text().collect();
    collapse_whitespace(&text.join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// At most [`SUMMARY_MAX_CHARS`] characters from the start of `content`, trimmed.
pub fn summarize(content: &str) -> String {
    content
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Estimated minutes to read `content` at [`WORDS_PER_MINUTE`], floored at
/// [`MIN_READ_MINUTES`].
pub fn read_minutes(content: &str) -> i64 {
    let words = content.split_whitespace().count();
    if words == 0 {
        return EMPTY_CONTENT_READ_MINUTES;
    }
    (words.div_ceil(WORDS_PER_MINUTE) as i64).max(MIN_READ_MINUTES)
}

/// Trim a headline and drop a trailing bracketed marker such as `[Video]`.
pub fn clean_title(title: &str) -> String {
    let title = collapse_whitespace(title);
    TRAILING_MARKER_REGEX.replace(&title, "").trim().to_string()
}
