use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    briefing::{BriefingArticle, BriefingSource, BriefingStats},
    config::MAX_RETENTION_DAYS,
    entities::ArticleStats,
    ingest::CycleReport,
    query::ArticleView,
};

pub const DEFAULT_ENHANCE_LIMIT: u32 = 10;
pub const MAX_ENHANCE_LIMIT: u32 = 100;

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleView>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub article: ArticleView,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub stats: ArticleStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FetchResponse {
    pub message: String,
    pub result: CycleReport,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CleanupParams {
    /// Retention horizon in days. Defaults to the configured horizon.
    pub days: Option<u32>,
}

impl CleanupParams {
    pub fn validate(&self, default_days: u32) -> Result<u32, String> {
        match self.days {
            None => Ok(default_days),
            Some(days) if days > MAX_RETENTION_DAYS => {
                Err(format!("days must be at most {MAX_RETENTION_DAYS}"))
            }
            Some(days) => Ok(days),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub message: String,
    pub deleted: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EnhanceRequest {
    pub limit: Option<u32>,
}

impl EnhanceRequest {
    pub fn validate(&self) -> Result<u32, String> {
        match self.limit {
            None => Ok(DEFAULT_ENHANCE_LIMIT),
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(limit) if limit > MAX_ENHANCE_LIMIT => {
                Err(format!("limit must be at most {MAX_ENHANCE_LIMIT}"))
            }
            Some(limit) => Ok(limit),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnhanceResponse {
    pub message: String,
    pub enhanced: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BriefingParams {
    /// Read stored feed articles first. `false` asks only the news APIs.
    pub rss: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BriefingResponse {
    pub articles: Vec<BriefingArticle>,
    pub count: usize,
    pub stats: BriefingStats,
    pub source: BriefingSource,
    pub timestamp: DateTime<Utc>,
}
