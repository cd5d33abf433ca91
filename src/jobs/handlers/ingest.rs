use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    ingest::{CycleOutcome, IngestionPipeline},
    jobs::JobHandler,
};

/// Scheduled ingestion cycle
#[derive(Clone)]
pub struct IngestJob {
    pipeline: Arc<IngestionPipeline>,
}

impl IngestJob {
    pub fn new(pipeline: Arc<IngestionPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl JobHandler for IngestJob {
    async fn run(&self) -> anyhow::Result<()> {
        match self.pipeline.run_cycle().await {
            CycleOutcome::Completed(report) => info!(
                fetched = report.fetched,
                saved = report.saved,
                errors = report.errors.len(),
                "scheduled ingestion completed"
            ),
            CycleOutcome::AlreadyRunning => {
                info!("scheduled ingestion skipped, a cycle is already running")
            }
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "ingest"
    }
}
