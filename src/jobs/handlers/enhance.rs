use async_trait::async_trait;
use tracing::info;

use crate::{enhance::EnhancementService, jobs::JobHandler};

#[derive(Clone)]
pub struct EnhanceJob {
    service: EnhancementService,
    batch: u32,
}

impl EnhanceJob {
    pub fn new(service: EnhancementService, batch: u32) -> Self {
        Self { service, batch }
    }
}

#[async_trait]
impl JobHandler for EnhanceJob {
    async fn run(&self) -> anyhow::Result<()> {
        let enhanced = self.service.enhance(self.batch).await?;
        info!(enhanced, batch = self.batch, "scheduled enhancement completed");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "enhance"
    }
}
