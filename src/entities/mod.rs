use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// --- Enums ---

/// Credibility review state owned by the enhancement collaborator.
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Approve,
    Review,
    Reject,
}

impl ValidationStatus {
    /// Map a validator recommendation onto a reviewed status. Anything
    /// unrecognised, "pending" included, needs a human look. `Pending` is
    /// never produced here since it marks an article as not yet reviewed.
    pub fn from_recommendation(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" | "verified" => Self::Approve,
            "reject" | "rejected" => Self::Reject,
            _ => Self::Review,
        }
    }
}

/// --- Tables ---

/// A persisted article row.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub content: String,
    pub summary: String,
    pub publication_date: DateTime<Utc>,
    pub source_name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    #[sqlx(json)]
    pub domains: Vec<String>, // serialised JSON list, never empty
    pub read_minutes: i64,
    pub credibility_score: Option<i64>,
    pub validation_status: ValidationStatus,
    pub is_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A normalised article that has not been stored yet: no id, no bookkeeping
/// timestamps, no enhancement fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewArticle {
    pub title: String,
    pub link: String,
    pub content: String,
    pub summary: String,
    pub publication_date: DateTime<Utc>,
    pub source_name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub domains: Vec<String>,
    pub read_minutes: i64,
}

/// Aggregates over the whole article table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub total: i64,
    pub distinct_sources: i64,
    pub distinct_categories: i64,
    pub avg_credibility_score: Option<f64>,
    pub category_distribution: BTreeMap<String, i64>,
    /// Top 10 sources by article count.
    pub source_distribution: BTreeMap<String, i64>,
}
