use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    entities::ValidationStatus,
    providers::{FallbackNewsClient, ProviderArticle},
    query::ArticleView,
    repositories::{ArticleQuery, ArticleStore},
};

pub const BRIEFING_SIZE: i64 = 30;
/// Below this many feed articles the briefing is topped up from providers.
pub const MIN_FEED_ARTICLES: usize = 10;
/// Origin key of stored feed articles in the briefing stats.
const FEED_ORIGIN: &str = "rss";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum BriefingSource {
    #[serde(rename = "rss")]
    Rss,
    #[serde(rename = "rss+api")]
    RssAndApi,
    #[serde(rename = "api")]
    Api,
}

/// A briefing entry. Provider articles were never stored, so they have no id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BriefingArticle {
    pub id: Option<i64>,
    pub title: String,
    pub link: String,
    pub url: String,
    pub summary: String,
    pub publication_date: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    pub source: String,
    pub category: String,
    pub image_url: Option<String>,
    pub domains: Vec<String>,
    pub read_minutes: i64,
    pub credibility_score: Option<i64>,
    pub validation_status: ValidationStatus,
    pub is_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_source: Option<String>,
}

impl From<ArticleView> for BriefingArticle {
    fn from(view: ArticleView) -> Self {
        Self {
            id: Some(view.id),
            title: view.title,
            link: view.link,
            url: view.url,
            summary: view.summary,
            publication_date: view.publication_date,
            published_at: view.published_at,
            source_name: view.source_name,
            source: view.source,
            category: view.category,
            image_url: view.image_url,
            domains: view.domains,
            read_minutes: view.read_minutes,
            credibility_score: view.credibility_score,
            validation_status: view.validation_status,
            is_generated: view.is_generated,
            api_source: None,
        }
    }
}

impl From<ProviderArticle> for BriefingArticle {
    fn from(ProviderArticle { provider, article }: ProviderArticle) -> Self {
        Self {
            id: None,
            title: article.title,
            url: article.link.clone(),
            link: article.link,
            summary: article.summary,
            publication_date: article.publication_date,
            published_at: article.publication_date,
            source: article.source_name.clone(),
            source_name: article.source_name,
            category: article.category,
            image_url: article.image_url,
            domains: article.domains,
            read_minutes: article.read_minutes,
            credibility_score: None,
            validation_status: ValidationStatus::Pending,
            is_generated: false,
            api_source: Some(provider.to_string()),
        }
    }
}

/// Aggregates over the articles of one briefing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BriefingStats {
    pub total: usize,
    pub generated: usize,
    /// Mean over the articles that carry a score, 0 when none do.
    pub avg_credibility: f64,
    pub domain_distribution: BTreeMap<String, usize>,
    /// Articles per origin: the provider name, or `rss` for stored feed articles.
    pub api_distribution: BTreeMap<String, usize>,
    /// Distinct source names.
    pub sources: usize,
}

impl BriefingStats {
    pub fn from_articles(articles: &[BriefingArticle]) -> Self {
        let mut domain_distribution = BTreeMap::new();
        let mut api_distribution = BTreeMap::new();
        let mut sources = HashSet::new();
        let mut scores = Vec::new();

        for article in articles {
            for domain in &article.domains {
                *domain_distribution.entry(domain.clone()).or_insert(0) += 1;
            }
            let origin = article.api_source.as_deref().unwrap_or(FEED_ORIGIN);
            *api_distribution.entry(origin.to_string()).or_insert(0) += 1;
            sources.insert(article.source_name.as_str());
            scores.extend(article.credibility_score);
        }

        let avg_credibility = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<i64>() as f64 / scores.len() as f64
        };

        Self {
            total: articles.len(),
            generated: articles.iter().filter(|a| a.is_generated).count(),
            avg_credibility,
            domain_distribution,
            api_distribution,
            sources: sources.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Briefing {
    pub articles: Vec<BriefingArticle>,
    pub stats: BriefingStats,
    pub source: BriefingSource,
}

impl Briefing {
    fn new(articles: Vec<BriefingArticle>, source: BriefingSource) -> Self {
        Self {
            stats: BriefingStats::from_articles(&articles),
            articles,
            source,
        }
    }
}

pub struct BriefingService {
    store: Arc<dyn ArticleStore>,
    fallback: Arc<FallbackNewsClient>,
}

impl BriefingService {
    pub fn new(store: Arc<dyn ArticleStore>, fallback: Arc<FallbackNewsClient>) -> Self {
        Self { store, fallback }
    }

    /// Newest feed articles, topped up from the fallback providers when the
    /// store is thin. With `use_feeds` off the store is skipped and only the
    /// providers are asked.
    pub async fn daily(&self, use_feeds: bool) -> Result<Briefing> {
        if !use_feeds {
            let mut articles: Vec<BriefingArticle> = self
                .fallback
                .fetch_all()
                .await
                .into_iter()
                .map(BriefingArticle::from)
                .collect();
            articles.truncate(BRIEFING_SIZE as usize);
            return Ok(Briefing::new(articles, BriefingSource::Api));
        }

        let query = ArticleQuery {
            limit: BRIEFING_SIZE,
            ..Default::default()
        };
        let mut articles: Vec<BriefingArticle> = self
            .store
            .query(&query)
            .await?
            .into_iter()
            .map(|a| BriefingArticle::from(ArticleView::from(a)))
            .collect();

        if articles.len() >= MIN_FEED_ARTICLES || !self.fallback.is_enabled() {
            return Ok(Briefing::new(articles, BriefingSource::Rss));
        }

        info!(feed_articles = articles.len(), "feed count low, using fallback providers");
        let mut seen: HashSet<String> = articles.iter().map(|a| a.url.clone()).collect();
        let before = articles.len();

        for extra in self.fallback.fetch_all().await {
            if seen.insert(extra.article.link.clone()) {
                articles.push(extra.into());
            }
        }
        articles.truncate(BRIEFING_SIZE as usize);

        let source = if articles.len() > before {
            BriefingSource::RssAndApi
        } else {
            BriefingSource::Rss
        };
        Ok(Briefing::new(articles, source))
    }
}
