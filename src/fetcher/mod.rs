pub mod client;
pub mod errors;
pub mod parser;
pub mod pipeline;
pub mod types;

pub use client::HttpFeedFetcher;
pub use errors::{FetchError, SourceError};
pub use parser::parse_feed;
pub use types::{Charset, FeedResponse};

use async_trait::async_trait;

use crate::{config::FeedSource, normalizer::RawItem};

/// Downloads and parses one feed source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawItem>, SourceError>;
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawItem>, SourceError> {
        let response = self.fetch_url(&source.url).await?;
        parse_feed(response.body_utf8.as_bytes())
    }
}
