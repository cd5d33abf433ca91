pub mod date;
pub mod image;
pub mod model;
pub mod text;

pub use model::RawItem;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::{
    classifier::classify,
    config::FeedSource,
    entities::NewArticle,
    normalizer::model::first_non_blank,
};

/// A single feed item that cannot become an article. The item is skipped,
/// the rest of its feed is not affected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("item has no title")]
    MissingTitle,

    #[error("item has no link")]
    MissingLink,

    #[error("invalid link {0:?}")]
    InvalidLink(String),
}

/// Turn a raw feed item into an article ready for insertion.
///
/// `now` is the ingestion time; it replaces publication dates that are
/// missing or unparseable.
pub fn normalize(
    raw: &RawItem,
    source: &FeedSource,
    now: DateTime<Utc>,
) -> Result<NewArticle, NormalizeError> {
    let title = raw
        .title
        .as_deref()
        .map(text::clean_title)
        .filter(|t| !t.is_empty())
        .ok_or(NormalizeError::MissingTitle)?;

    let link = first_non_blank(&[raw.link.as_deref()])
        .map(str::trim)
        .ok_or(NormalizeError::MissingLink)?;
    let link = url::Url::parse(link)
        .map_err(|_| NormalizeError::InvalidLink(link.to_string()))?
        .to_string();

    let content = first_non_blank(&[
        raw.content_snippet.as_deref(),
        raw.content.as_deref(),
        raw.description.as_deref(),
    ])
    .map(text::html_to_text)
    .unwrap_or_default();

    let domains = classify(&title, &content, Some(&source.category));

    Ok(NewArticle {
        summary: text::summarize(&content),
        read_minutes: text::read_minutes(&content),
        publication_date: date::publication_date_or(raw.pub_date.as_deref(), now),
        image_url: image::extract_image_url(raw),
        author: first_non_blank(&[raw.creator.as_deref(), raw.author.as_deref()])
            .map(|a| a.trim().to_string()),
        source_name: source.name.clone(),
        category: source.category.clone(),
        title,
        link,
        content,
        domains,
    })
}

/// Ingestion timestamp at the precision the store keeps.
pub fn ingestion_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
