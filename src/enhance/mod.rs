pub mod validator;

pub use validator::{
    CredibilityValidator, DisabledValidator, EnhanceError, HttpValidator, Verdict,
};

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{config::Config, repositories::ArticleStore};

/// Scores pending articles with the credibility validator.
#[derive(Clone)]
pub struct EnhancementService {
    store: Arc<dyn ArticleStore>,
    validator: Arc<dyn CredibilityValidator>,
}

impl EnhancementService {
    pub fn new(store: Arc<dyn ArticleStore>, validator: Arc<dyn CredibilityValidator>) -> Self {
        Self { store, validator }
    }

    pub fn is_available(&self) -> bool {
        self.validator.is_configured()
    }

    /// Validate up to `limit` pending articles and return how many were
    /// updated. Articles the validator fails on stay pending.
    pub async fn enhance(&self, limit: u32) -> Result<usize> {
        if !self.is_available() {
            info!("enhancement skipped: validator not configured");
            return Ok(0);
        }

        let candidates = self.store.enhancement_candidates(i64::from(limit)).await?;
        let mut enhanced = 0;

        for article in &candidates {
            let verdict = match self.validator.validate(article).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(article_id = article.id, error = %e, "enhancement failed");
                    continue;
                }
            };

            if self
                .store
                .update_validation(article.id, verdict.credibility_score, verdict.status)
                .await?
            {
                enhanced += 1;
            } else {
                debug!(article_id = article.id, "article vanished before update");
            }
        }

        info!(candidates = candidates.len(), enhanced, "enhancement pass finished");
        Ok(enhanced)
    }
}

/// The HTTP validator when an endpoint is configured, otherwise the disabled one.
pub fn validator_from_config(config: &Config) -> Result<Arc<dyn CredibilityValidator>> {
    match config.validator_url() {
        Some(url) => Ok(Arc::new(HttpValidator::new(url, config.validator_timeout())?)),
        None => Ok(Arc::new(DisabledValidator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::{Article, ValidationStatus},
        enhance::validator::MockCredibilityValidator,
        repositories::article::MockArticleStore,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn pending(id: i64) -> Article {
        let now = Utc::now();
        Article {
            id,
            title: format!("Story {id}"),
            link: format!("https://example.com/{id}"),
            content: String::new(),
            summary: String::new(),
            publication_date: now,
            source_name: "Example Wire".to_string(),
            category: "business".to_string(),
            image_url: None,
            author: None,
            domains: vec!["business".to_string()],
            read_minutes: 3,
            credibility_score: None,
            validation_status: ValidationStatus::Pending,
            is_generated: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_not_configured_touches_nothing() {
        // No expectations: any store call panics
        let store = MockArticleStore::new();
        let service = EnhancementService::new(Arc::new(store), Arc::new(DisabledValidator));

        assert_eq!(service.enhance(10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failures_leave_articles_pending() {
        let mut store = MockArticleStore::new();
        store
            .expect_enhancement_candidates()
            .with(eq(5))
            .returning(|_| Ok(vec![pending(1), pending(2)]));
        store
            .expect_update_validation()
            .with(eq(1), eq(7), eq(ValidationStatus::Approve))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let mut validator = MockCredibilityValidator::new();
        validator.expect_is_configured().return_const(true);
        validator.expect_validate().returning(|article| {
            if article.id == 1 {
                Ok(Verdict {
                    credibility_score: 7,
                    status: ValidationStatus::Approve,
                })
            } else {
                Err(EnhanceError::Timeout)
            }
        });

        let service = EnhancementService::new(Arc::new(store), Arc::new(validator));
        assert_eq!(service.enhance(5).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockArticleStore::new();
        store
            .expect_enhancement_candidates()
            .returning(|_| Err(anyhow::anyhow!("database is locked")));

        let mut validator = MockCredibilityValidator::new();
        validator.expect_is_configured().return_const(true);

        let service = EnhancementService::new(Arc::new(store), Arc::new(validator));
        assert!(service.enhance(5).await.is_err());
    }
}
