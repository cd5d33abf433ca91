use serde::{Deserialize, Serialize};

/// One feed entry as the parser hands it over, before any cleanup.
///
/// Every field is optional because feeds omit whatever they like. The HTML
/// bearing fields (`content`, `content_encoded`, `description`) are kept raw so
/// the image scan can look inside them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Plain-text rendering of the body, derived by the parser.
    pub content_snippet: Option<String>,
    pub content: Option<String>,
    pub content_encoded: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub enclosure_url: Option<String>,
    pub media_content_url: Option<String>,
    pub media_thumbnail_url: Option<String>,
}

/// First non-blank value among the candidates.
pub(crate) fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| !value.trim().is_empty())
}
