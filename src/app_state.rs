use std::sync::Arc;

use anyhow::Result;

use crate::{
    briefing::BriefingService,
    config::Config,
    enhance::{EnhancementService, validator_from_config},
    fetcher::HttpFeedFetcher,
    ingest::IngestionPipeline,
    providers::{FallbackNewsClient, ProviderRegistry},
    query::QueryService,
    repositories::{ArticleRepository, ArticleStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub query: QueryService,
    pub pipeline: Arc<IngestionPipeline>,
    pub enhancement: EnhancementService,
    pub briefing: Arc<BriefingService>,
    pub retention_days: u32,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        pipeline: Arc<IngestionPipeline>,
        enhancement: EnhancementService,
        briefing: Arc<BriefingService>,
        retention_days: u32,
    ) -> Self {
        Self {
            query: QueryService::new(store.clone()),
            store,
            pipeline,
            enhancement,
            briefing,
            retention_days,
        }
    }

    /// Wire every service around an opened repository.
    pub fn from_config(config: &Config, repository: ArticleRepository) -> Result<Self> {
        let store: Arc<dyn ArticleStore> = Arc::new(repository);

        let fetcher = HttpFeedFetcher::new(config.fetch().timeout)?;
        let pipeline = Arc::new(IngestionPipeline::new(
            store.clone(),
            Arc::new(fetcher),
            config.sources().to_vec(),
            config.fetch(),
        ));

        let enhancement = EnhancementService::new(store.clone(), validator_from_config(config)?);

        let fallback = FallbackNewsClient::new(ProviderRegistry::from_keys(config.provider_keys()))?;
        let briefing = Arc::new(BriefingService::new(store.clone(), Arc::new(fallback)));

        Ok(Self::new(
            store,
            pipeline,
            enhancement,
            briefing,
            config.retention_days(),
        ))
    }
}
