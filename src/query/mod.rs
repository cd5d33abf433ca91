use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    entities::{Article, ArticleStats, ValidationStatus},
    repositories::{ArticleQuery, ArticleStore},
};

pub const DEFAULT_LIMIT: i64 = 30;
pub const MAX_LIMIT: i64 = 100;

/// Listing parameters as callers send them.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListArticlesRequest {
    /// Exact source category.
    pub category: Option<String>,
    /// Page size, 1 to 100. Defaults to 30.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Domain tag, matched as a substring.
    pub domains: Option<String>,
    /// Case-insensitive text in title or content.
    pub search: Option<String>,
}

impl ListArticlesRequest {
    pub fn into_query(self) -> ArticleQuery {
        ArticleQuery {
            category: non_blank(self.category),
            domain: non_blank(self.domains),
            search: non_blank(self.search),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// An article as readers see it. Older clients know the link as `url`, the
/// source as `source` and the date as `publishedAt`, so both spellings go out.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub url: String,
    pub content: String,
    pub summary: String,
    pub publication_date: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    pub source: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub domains: Vec<String>,
    pub read_minutes: i64,
    pub credibility_score: Option<i64>,
    pub validation_status: ValidationStatus,
    pub is_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            url: article.link.clone(),
            link: article.link,
            title: article.title,
            content: article.content,
            summary: article.summary,
            published_at: article.publication_date,
            publication_date: article.publication_date,
            source: article.source_name.clone(),
            source_name: article.source_name,
            category: article.category,
            image_url: article.image_url,
            author: article.author,
            domains: article.domains,
            read_minutes: article.read_minutes,
            credibility_score: article.credibility_score,
            validation_status: article.validation_status,
            is_generated: article.is_generated,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Read side of the store.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn ArticleStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, request: ListArticlesRequest) -> Result<Vec<ArticleView>> {
        let articles = self.store.query(&request.into_query()).await?;
        Ok(articles.into_iter().map(ArticleView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<ArticleView>> {
        Ok(self.store.get_by_id(id).await?.map(ArticleView::from))
    }

    pub async fn stats(&self) -> Result<ArticleStats> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::article::MockArticleStore;
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn stored_article() -> Article {
        let at = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();
        Article {
            id: 7,
            title: "Chip maker unveils new processor".to_string(),
            link: "https://example.com/chip".to_string(),
            content: "Faster cores".to_string(),
            summary: "Faster cores".to_string(),
            publication_date: at,
            source_name: "Tech Daily".to_string(),
            category: "technology".to_string(),
            image_url: None,
            author: None,
            domains: vec!["technology".to_string()],
            read_minutes: 2,
            credibility_score: None,
            validation_status: ValidationStatus::Pending,
            is_generated: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_request_defaults_and_clamping() {
        let query = ListArticlesRequest::default().into_query();
        assert_eq!(query.limit, 30);
        assert_eq!(query.offset, 0);
        assert_eq!(query.category, None);

        let query = ListArticlesRequest {
            limit: Some(1000),
            offset: Some(-5),
            category: Some("  ".to_string()),
            domains: Some(" tech ".to_string()),
            ..Default::default()
        }
        .into_query();
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
        assert_eq!(query.category, None);
        assert_eq!(query.domain.as_deref(), Some("tech"));

        assert_eq!(
            ListArticlesRequest {
                limit: Some(0),
                ..Default::default()
            }
            .into_query()
            .limit,
            1
        );
    }

    #[test]
    fn test_view_carries_both_namings() {
        let json = serde_json::to_value(ArticleView::from(stored_article())).unwrap();

        assert_eq!(json["link"], json["url"]);
        assert_eq!(json["sourceName"], "Tech Daily");
        assert_eq!(json["source"], "Tech Daily");
        assert_eq!(json["publicationDate"], json["publishedAt"]);
        assert_eq!(json["domains"], serde_json::json!(["technology"]));
        assert_eq!(json["isGenerated"], false);
        assert_eq!(json["validationStatus"], "pending");
    }

    #[tokio::test]
    async fn test_list_passes_adapted_query() {
        let mut store = MockArticleStore::new();
        store
            .expect_query()
            .with(eq(ArticleQuery {
                category: Some("technology".to_string()),
                limit: 2,
                ..Default::default()
            }))
            .times(1)
            .returning(|_| Ok(vec![stored_article()]));

        let service = QueryService::new(Arc::new(store));
        let views = service
            .list(ListArticlesRequest {
                category: Some("technology".to_string()),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].url, "https://example.com/chip");
    }

    #[tokio::test]
    async fn test_get_missing_article() {
        let mut store = MockArticleStore::new();
        store.expect_get_by_id().with(eq(42)).returning(|_| Ok(None));

        let service = QueryService::new(Arc::new(store));
        assert_eq!(service.get(42).await.unwrap(), None);
    }
}
