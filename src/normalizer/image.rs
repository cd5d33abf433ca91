use regex::Regex;
use std::sync::LazyLock;

use crate::normalizer::model::{RawItem, first_non_blank};

static IMG_SRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\s[^>]*?src\s*=\s*["']([^"'>]+)["']"#).unwrap());

/// Best-effort image for an item: enclosure, then `media:content`, then
/// `media:thumbnail`, then the first `<img src>` found in the HTML body.
pub fn extract_image_url(item: &RawItem) -> Option<String> {
    if let Some(url) = first_non_blank(&[
        item.enclosure_url.as_deref(),
        item.media_content_url.as_deref(),
        item.media_thumbnail_url.as_deref(),
    ]) {
        return Some(url.trim().to_string());
    }

    [&item.content, &item.content_encoded, &item.description]
        .into_iter()
        .flatten()
        .find_map(|html| first_img_src(html))
}

pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
}
