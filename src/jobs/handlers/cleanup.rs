use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{jobs::JobHandler, repositories::ArticleStore};

/// Retention sweep. Runs without coordinating with ingestion; fresh rows are
/// never old enough to be deleted.
#[derive(Clone)]
pub struct CleanupJob {
    store: Arc<dyn ArticleStore>,
    days: u32,
}

impl CleanupJob {
    pub fn new(store: Arc<dyn ArticleStore>, days: u32) -> Self {
        Self { store, days }
    }
}

#[async_trait]
impl JobHandler for CleanupJob {
    async fn run(&self) -> anyhow::Result<()> {
        let deleted = self.store.delete_older_than(self.days).await?;
        info!(deleted, days = self.days, "retention sweep completed");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "cleanup"
    }
}
