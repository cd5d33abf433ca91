use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One source that could not be read during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Outcome of one pass over every configured source.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CycleReport {
    /// Items that normalised into articles.
    pub fetched: usize,
    /// Articles actually written; duplicates don't count.
    pub saved: usize,
    pub errors: Vec<SourceFailure>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle held the guard; nothing was fetched.
    AlreadyRunning,
}

impl CycleOutcome {
    pub fn report(self) -> Option<CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::AlreadyRunning => None,
        }
    }
}
