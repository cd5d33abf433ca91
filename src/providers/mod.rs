//! Fallback news from JSON news APIs, used when the feeds come up short.
//!
//! Each provider names its fields differently; a [`ProviderAdapter`] maps one
//! provider's payload onto [`CanonicalFields`], and everything after that is
//! shared. Provider articles are served, never stored.

pub mod adapters;

pub use adapters::{GNews, NewsApiOrg, NewsDataIo, TheNewsApi};

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, header};
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::{
    config::{FeedSource, ProviderKeys},
    entities::NewArticle,
    normalizer::{RawItem, ingestion_time, normalize},
};

pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
pub const ENDPOINT_DELAY: Duration = Duration::from_millis(500);
pub const MAX_PROVIDER_ARTICLES: usize = 30;
const TITLE_KEY_CHARS: usize = 50;
const PROVIDER_CATEGORY: &str = "general";
const USER_AGENT: &str = "feedwire/0.1";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned http {0}")]
    Status(u16),
}

/// One request a provider wants made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub name: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl ProviderEndpoint {
    pub fn new(name: &'static str, url: String, params: &[(&str, &str)]) -> Self {
        Self {
            name,
            url,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// The provider-independent shape of one news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFields {
    pub title: String,
    pub source_name: String,
    pub summary: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
}

pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn endpoints(&self, api_key: &str) -> Vec<ProviderEndpoint>;

    /// The list of raw items inside one response body.
    fn articles(&self, body: &Value) -> Vec<Value>;

    /// `None` drops the item.
    fn normalize(&self, raw: &Value) -> Option<CanonicalFields>;
}

/// An article from a provider, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderArticle {
    pub provider: &'static str,
    pub article: NewArticle,
}

/// Adapters that have an API key.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<(Arc<dyn ProviderAdapter>, String)>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: &ProviderKeys) -> Self {
        let mut registry = Self::new();
        if let Some(key) = &keys.newsapi_org {
            registry.register(Arc::new(NewsApiOrg::new()), key);
        }
        if let Some(key) = &keys.gnews {
            registry.register(Arc::new(GNews::new()), key);
        }
        if let Some(key) = &keys.newsdata_io {
            registry.register(Arc::new(NewsDataIo::new()), key);
        }
        if let Some(key) = &keys.thenewsapi {
            registry.register(Arc::new(TheNewsApi::new()), key);
        }
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>, api_key: &str) {
        self.providers.push((adapter, api_key.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|(a, _)| a.name()).collect()
    }
}

pub struct FallbackNewsClient {
    client: Client,
    registry: ProviderRegistry,
    endpoint_delay: Duration,
}

impl FallbackNewsClient {
    pub fn new(registry: ProviderRegistry) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            registry,
            endpoint_delay: ENDPOINT_DELAY,
        })
    }

    pub fn with_endpoint_delay(mut self, delay: Duration) -> Self {
        self.endpoint_delay = delay;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Query every enabled provider at once. Deduplicated by url and by title
    /// prefix, newest first, at most [`MAX_PROVIDER_ARTICLES`].
    pub async fn fetch_all(&self) -> Vec<ProviderArticle> {
        if !self.is_enabled() {
            debug!("no fallback providers configured");
            return Vec::new();
        }

        let now = ingestion_time();
        let per_provider = join_all(self.registry.providers.iter().map(|(adapter, key)| {
            self.fetch_provider(adapter.as_ref(), key, now)
                .instrument(info_span!("provider", name = adapter.name()))
        }))
        .await;

        let articles = dedupe_and_rank(per_provider.into_iter().flatten().collect());
        info!(count = articles.len(), "fallback articles collected");
        articles
    }

    async fn fetch_provider(
        &self,
        adapter: &dyn ProviderAdapter,
        api_key: &str,
        now: DateTime<Utc>,
    ) -> Vec<ProviderArticle> {
        let mut collected = Vec::new();
        let endpoints = adapter.endpoints(api_key);

        for (i, endpoint) in endpoints.iter().enumerate() {
            if i > 0 && !self.endpoint_delay.is_zero() {
                tokio::time::sleep(self.endpoint_delay).await;
            }

            match self.request(endpoint).await {
                Ok(body) => {
                    let before = collected.len();
                    collected.extend(
                        adapter
                            .articles(&body)
                            .iter()
                            .filter_map(|raw| adapter.normalize(raw))
                            .filter(|fields| !fields.title.contains("[Removed]"))
                            .filter_map(|fields| to_article(adapter.name(), fields, now)),
                    );
                    debug!(
                        endpoint = endpoint.name,
                        count = collected.len() - before,
                        "endpoint fetched"
                    );
                }
                Err(e) => warn!(endpoint = endpoint.name, error = %e, "provider endpoint failed"),
            }
        }

        collected
    }

    #[instrument(skip_all, fields(url = %endpoint.url))]
    async fn request(&self, endpoint: &ProviderEndpoint) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(&endpoint.url)
            .query(&endpoint.params)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Run the canonical fields through the feed normalizer so provider articles
/// get the same cleanup, summary, read time and domains as feed articles.
fn to_article(
    provider: &'static str,
    fields: CanonicalFields,
    now: DateTime<Utc>,
) -> Option<ProviderArticle> {
    let raw = RawItem {
        title: Some(fields.title),
        link: Some(fields.url.clone()),
        content_snippet: Some(fields.summary),
        pub_date: fields.published_at,
        enclosure_url: fields.image_url,
        ..Default::default()
    };
    let source = FeedSource {
        name: fields.source_name,
        url: fields.url,
        category: PROVIDER_CATEGORY.to_string(),
    };

    match normalize(&raw, &source, now) {
        Ok(article) => Some(ProviderArticle { provider, article }),
        Err(e) => {
            debug!(provider, error = %e, "dropping provider item");
            None
        }
    }
}

fn title_key(title: &str) -> String {
    title.to_lowercase().chars().take(TITLE_KEY_CHARS).collect()
}

fn dedupe_and_rank(articles: Vec<ProviderArticle>) -> Vec<ProviderArticle> {
    let mut seen_urls = HashSet::new();
    let mut seen_titles = HashSet::new();

    let mut unique: Vec<ProviderArticle> = articles
        .into_iter()
        .filter(|a| {
            let url_new = !seen_urls.contains(&a.article.link);
            let title_new = !seen_titles.contains(&title_key(&a.article.title));
            if url_new && title_new {
                seen_urls.insert(a.article.link.clone());
                seen_titles.insert(title_key(&a.article.title));
                true
            } else {
                false
            }
        })
        .collect();

    unique.sort_by(|a, b| b.article.publication_date.cmp(&a.article.publication_date));
    unique.truncate(MAX_PROVIDER_ARTICLES);
    unique
}
