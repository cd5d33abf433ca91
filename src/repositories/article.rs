use std::{path::Path, str::FromStr};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::{
    QueryBuilder, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info};

use crate::{
    entities::{Article, ArticleStats, NewArticle, ValidationStatus},
    normalizer::ingestion_time,
};

const SOURCE_DISTRIBUTION_LIMIT: i64 = 10;

/// Filters for listing articles. Blank filters are dropped by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub category: Option<String>,
    /// Substring of the serialised domain list, so `tech` also hits `technology`.
    pub domain: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert unless an article with the same link exists. Returns whether a row was written.
    async fn insert_ignore_duplicate(&self, article: &NewArticle) -> Result<bool>;

    /// Newest publication first.
    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    async fn stats(&self) -> Result<ArticleStats>;

    /// Remove articles ingested more than `days` days ago.
    async fn delete_older_than(&self, days: u32) -> Result<u64>;

    /// Pending articles, most recently ingested first.
    async fn enhancement_candidates(&self, limit: i64) -> Result<Vec<Article>>;

    async fn update_validation(
        &self,
        id: i64,
        credibility_score: i64,
        status: ValidationStatus,
    ) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn open(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(options.get_filename()).await?;
        }

        // Every connection to an in-memory database is a separate database
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        info!(database_url, "article store opened");
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("article store closed");
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert with an explicit ingestion time.
    pub async fn insert_at(&self, article: &NewArticle, created_at: DateTime<Utc>) -> Result<bool> {
        let domains = serde_json::to_string(&article.domains)?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles
                  (title, link, content, summary, publication_date, source_name, category,
                   image_url, author, domains, read_minutes, validation_status, is_generated,
                   search_text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            ON CONFLICT (link) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.link)
        .bind(&article.content)
        .bind(&article.summary)
        .bind(article.publication_date)
        .bind(&article.source_name)
        .bind(&article.category)
        .bind(&article.image_url)
        .bind(&article.author)
        .bind(domains)
        .bind(article.read_minutes)
        .bind(ValidationStatus::Pending)
        .bind(search_text(&article.title, &article.content))
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn insert_ignore_duplicate(&self, article: &NewArticle) -> Result<bool> {
        self.insert_at(article, ingestion_time()).await
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM articles WHERE 1 = 1");

        if let Some(category) = &query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(domain) = &query.domain {
            builder
                .push(" AND domains LIKE ")
                .push_bind(like_pattern(domain))
                .push(" ESCAPE '\\'");
        }
        if let Some(search) = &query.search {
            builder
                .push(" AND search_text LIKE ")
                .push_bind(like_pattern(&search.to_lowercase()))
                .push(" ESCAPE '\\'");
        }

        builder
            .push(" ORDER BY publication_date DESC, id DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let articles = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(article)
    }

    async fn stats(&self) -> Result<ArticleStats> {
        let (total, distinct_sources, distinct_categories, avg_credibility_score) =
            sqlx::query_as::<_, (i64, i64, i64, Option<f64>)>(
                r#"
                SELECT COUNT(*),
                       COUNT(DISTINCT source_name),
                       COUNT(DISTINCT category),
                       AVG(credibility_score)
                FROM articles
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let category_distribution = sqlx::query_as::<_, (String, i64)>(
            "SELECT category, COUNT(*) FROM articles GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        let source_distribution = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT source_name, COUNT(*) AS n
            FROM articles
            GROUP BY source_name
            ORDER BY n DESC, source_name
            LIMIT ?
            "#,
        )
        .bind(SOURCE_DISTRIBUTION_LIMIT)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        Ok(ArticleStats {
            total,
            distinct_sources,
            distinct_categories,
            avg_credibility_score,
            category_distribution,
            source_distribution,
        })
    }

    async fn delete_older_than(&self, days: u32) -> Result<u64> {
        let cutoff = TimeDelta::try_days(i64::from(days))
            .and_then(|horizon| ingestion_time().checked_sub_signed(horizon))
            .ok_or_else(|| anyhow!("retention horizon of {days} days is out of range"))?;

        let result = sqlx::query("DELETE FROM articles WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        debug!(days, %cutoff, deleted = result.rows_affected(), "retention sweep");
        Ok(result.rows_affected())
    }

    async fn enhancement_candidates(&self, limit: i64) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT * FROM articles
            WHERE validation_status = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(ValidationStatus::Pending)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }

    async fn update_validation(
        &self,
        id: i64,
        credibility_score: i64,
        status: ValidationStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET credibility_score = ?, validation_status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(credibility_score)
        .bind(status)
        .bind(ingestion_time())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Lowercased title and content, matched by text search.
fn search_text(title: &str, content: &str) -> String {
    format!("{title}\n{content}").to_lowercase()
}

/// `%term%` with LIKE wildcards in the term taken literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound, TimeZone};

    async fn setup_store() -> ArticleRepository {
        ArticleRepository::open("sqlite::memory:")
            .await
            .expect("Failed to open in-memory store")
    }

    fn article(link: &str, category: &str, published_hour: u32) -> NewArticle {
        NewArticle {
            title: format!("Story {link}"),
            link: link.to_string(),
            content: "Some body text".to_string(),
            summary: "Some body text".to_string(),
            publication_date: Utc.with_ymd_and_hms(2025, 6, 10, published_hour, 0, 0).unwrap(),
            source_name: "Example Wire".to_string(),
            category: category.to_string(),
            image_url: None,
            author: None,
            domains: vec![category.to_string()],
            read_minutes: 2,
        }
    }

    fn query() -> ArticleQuery {
        ArticleQuery {
            limit: 30,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_ignores_duplicate_links() {
        let store = setup_store().await;
        let first = article("https://x.com/a", "business", 8);

        assert!(store.insert_ignore_duplicate(&first).await.unwrap());

        let mut second = first.clone();
        second.title = "Changed title".to_string();
        assert!(!store.insert_ignore_duplicate(&second).await.unwrap());

        let all = store.query(&query()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, first.title);
        assert_eq!(all[0].validation_status, ValidationStatus::Pending);
        assert!(!all[0].is_generated);
    }

    #[tokio::test]
    async fn test_query_by_category_is_limited_and_ordered() {
        let store = setup_store().await;
        for hour in [3, 9, 1, 7, 5] {
            let link = format!("https://example.com/tech/{hour}");
            store
                .insert_ignore_duplicate(&article(&link, "technology", hour))
                .await
                .unwrap();
        }
        store
            .insert_ignore_duplicate(&article("https://example.com/biz", "business", 23))
            .await
            .unwrap();

        let results = store
            .query(&ArticleQuery {
                category: Some("technology".to_string()),
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://example.com/tech/9");
        assert_eq!(results[1].link, "https://example.com/tech/7");

        let page = store
            .query(&ArticleQuery {
                category: Some("technology".to_string()),
                limit: 2,
                offset: 4,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].link, "https://example.com/tech/1");
    }

    #[tokio::test]
    async fn test_domain_filter_is_substring() {
        let store = setup_store().await;
        let mut tech = article("https://example.com/t", "technology", 1);
        tech.domains = vec!["technology".to_string(), "finance".to_string()];
        store.insert_ignore_duplicate(&tech).await.unwrap();
        store
            .insert_ignore_duplicate(&article("https://example.com/s", "sports", 2))
            .await
            .unwrap();

        let hits = store
            .query(&ArticleQuery {
                domain: Some("tech".to_string()),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domains, vec!["technology", "finance"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let store = setup_store().await;
        let mut a = article("https://example.com/a", "business", 1);
        a.title = "Nifty hits record".to_string();
        let mut b = article("https://example.com/b", "business", 2);
        b.content = "Margins rose 5% this quarter".to_string();
        store.insert_ignore_duplicate(&a).await.unwrap();
        store.insert_ignore_duplicate(&b).await.unwrap();

        let by_title = store
            .query(&ArticleQuery {
                search: Some("NIFTY".to_string()),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].link, "https://example.com/a");

        let percent = store
            .query(&ArticleQuery {
                search: Some("5%".to_string()),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].link, "https://example.com/b");

        let wildcard = store
            .query(&ArticleQuery {
                search: Some("%".to_string()),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(wildcard.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_read_time_below_floor() {
        let store = setup_store().await;
        let mut short = article("https://example.com/short", "business", 1);
        short.read_minutes = 1;

        assert!(store.insert_ignore_duplicate(&short).await.is_err());
        assert!(store.query(&query()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let store = setup_store().await;
        let mut a = article("https://example.com/fr", "business", 1);
        a.title = "Économie française en croissance".to_string();
        let mut b = article("https://example.com/gr", "business", 2);
        b.content = "ΑΘΗΝΑ: νέα μέτρα".to_string();
        store.insert_ignore_duplicate(&a).await.unwrap();
        store.insert_ignore_duplicate(&b).await.unwrap();

        for (term, link) in [
            ("économie", "https://example.com/fr"),
            ("ÉCONOMIE FRANÇAISE", "https://example.com/fr"),
            ("αθηνα", "https://example.com/gr"),
        ] {
            let hits = store
                .query(&ArticleQuery {
                    search: Some(term.to_string()),
                    ..query()
                })
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "search {term:?}");
            assert_eq!(hits[0].link, link);
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = setup_store().await;
        store
            .insert_ignore_duplicate(&article("https://example.com/one", "business", 1))
            .await
            .unwrap();
        let stored = store.query(&query()).await.unwrap().remove(0);

        let found = store.get_by_id(stored.id).await.unwrap();
        assert_eq!(found, Some(stored.clone()));
        assert_eq!(store.get_by_id(stored.id + 100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = setup_store().await;
        let empty = store.stats().await.unwrap();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.avg_credibility_score, None);

        for (i, category) in ["business", "business", "technology"].iter().enumerate() {
            let mut a = article(&format!("https://example.com/{i}"), category, 1);
            if i == 2 {
                a.source_name = "Tech Daily".to_string();
            }
            store.insert_ignore_duplicate(&a).await.unwrap();
        }
        let ids: Vec<i64> = store.query(&query()).await.unwrap().iter().map(|a| a.id).collect();
        store
            .update_validation(ids[0], 8, ValidationStatus::Approve)
            .await
            .unwrap();
        store
            .update_validation(ids[1], 4, ValidationStatus::Review)
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.distinct_sources, 2);
        assert_eq!(stats.distinct_categories, 2);
        assert_eq!(stats.avg_credibility_score, Some(6.0));
        assert_eq!(stats.category_distribution["business"], 2);
        assert_eq!(stats.category_distribution["technology"], 1);
        assert_eq!(stats.source_distribution["Example Wire"], 2);
        assert_eq!(stats.source_distribution["Tech Daily"], 1);
    }

    #[tokio::test]
    async fn test_delete_older_than_keys_on_ingestion_time() {
        let store = setup_store().await;
        let now = Utc::now().trunc_subsecs(0);

        for days in [0, 6, 8, 10] {
            let link = format!("https://example.com/age/{days}");
            store
                .insert_at(&article(&link, "business", 1), now - Duration::days(days))
                .await
                .unwrap();
        }

        let deleted = store.delete_older_than(7).await.unwrap();
        assert_eq!(deleted, 2);

        let mut remaining: Vec<String> = store
            .query(&query())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.link)
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec!["https://example.com/age/0", "https://example.com/age/6"]
        );
    }

    #[tokio::test]
    async fn test_delete_older_than_rejects_unrepresentable_horizon() {
        let store = setup_store().await;
        store
            .insert_ignore_duplicate(&article("https://example.com/kept", "business", 1))
            .await
            .unwrap();

        let outcome = tokio::spawn({
            let store = store.clone();
            async move { store.delete_older_than(u32::MAX).await }
        })
        .await
        .expect("retention sweep must not panic");

        assert!(outcome.is_err());
        assert_eq!(store.stats().await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_enhancement_candidates_and_update() {
        let store = setup_store().await;
        let now = Utc::now().trunc_subsecs(0);
        store
            .insert_at(&article("https://example.com/old", "business", 1), now - Duration::hours(2))
            .await
            .unwrap();
        store
            .insert_at(&article("https://example.com/new", "business", 1), now)
            .await
            .unwrap();

        let candidates = store.enhancement_candidates(10).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].link, "https://example.com/new");

        assert!(
            store
                .update_validation(candidates[0].id, 9, ValidationStatus::Approve)
                .await
                .unwrap()
        );
        assert!(
            !store
                .update_validation(9999, 1, ValidationStatus::Reject)
                .await
                .unwrap()
        );

        let remaining = store.enhancement_candidates(10).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].link, "https://example.com/old");

        let updated = store.get_by_id(candidates[0].id).await.unwrap().unwrap();
        assert_eq!(updated.credibility_score, Some(9));
        assert_eq!(updated.validation_status, ValidationStatus::Approve);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tech"), "%tech%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
