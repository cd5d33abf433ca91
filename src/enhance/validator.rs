use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::entities::{Article, ValidationStatus};

pub const MAX_CREDIBILITY_SCORE: i64 = 10;

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("credibility validator is not configured")]
    NotConfigured,

    #[error("validator timed out")]
    Timeout,

    #[error("validator request failed: {0}")]
    Transport(String),

    #[error("validator returned http {0}")]
    Status(u16),

    #[error("malformed validator reply: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for EnhanceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// 0 to [`MAX_CREDIBILITY_SCORE`].
    pub credibility_score: i64,
    pub status: ValidationStatus,
}

/// External judge of an article's credibility.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredibilityValidator: Send + Sync {
    async fn validate(&self, article: &Article) -> Result<Verdict, EnhanceError>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Used when no validator endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledValidator;

#[async_trait]
impl CredibilityValidator for DisabledValidator {
    async fn validate(&self, _article: &Article) -> Result<Verdict, EnhanceError> {
        Err(EnhanceError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationRequest<'a> {
    title: &'a str,
    source_name: &'a str,
    summary: &'a str,
    url: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReply {
    credibility_score: f64,
    recommendation: String,
}

/// Validator reached over HTTP. Every call is bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: Client,
    endpoint: String,
}

impl HttpValidator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EnhanceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnhanceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CredibilityValidator for HttpValidator {
    #[instrument(skip_all, fields(article_id = article.id, endpoint = %self.endpoint))]
    async fn validate(&self, article: &Article) -> Result<Verdict, EnhanceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidationRequest {
                title: &article.title,
                source_name: &article.source_name,
                summary: &article.summary,
                url: &article.link,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnhanceError::Status(status.as_u16()));
        }

        let reply: ValidationReply = response.json().await?;
        if !reply.credibility_score.is_finite() {
            return Err(EnhanceError::Malformed("non-finite credibility score".into()));
        }

        Ok(Verdict {
            credibility_score: (reply.credibility_score.round() as i64)
                .clamp(0, MAX_CREDIBILITY_SCORE),
            status: ValidationStatus::from_recommendation(&reply.recommendation),
        })
    }
}
