use std::sync::Arc;

use anyhow::Result;
use feedwire::{
    api,
    app_state::AppState,
    config::Config,
    jobs::{CleanupJob, EnhanceJob, IngestJob, JobRegistry, Scheduler, cancel_on_ctrl_c},
    repositories::ArticleRepository,
    telemetry,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let repository = ArticleRepository::open(config.database_url()).await?;
    let state = AppState::from_config(&config, repository.clone())?;

    let mut registry = JobRegistry::new();
    registry.register(IngestJob::new(state.pipeline.clone()), config.ingest_interval());
    registry.register(
        CleanupJob::new(state.store.clone(), config.retention_days()),
        config.cleanup_interval(),
    );
    if state.enhancement.is_available() {
        registry.register(
            EnhanceJob::new(state.enhancement.clone(), config.enhance_batch_size()),
            config.enhance_interval(),
        );
    }

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());
    let scheduler = tokio::spawn(Scheduler::new(registry, shutdown.clone()).run());

    if config.ingest_on_startup() {
        let pipeline = Arc::clone(&state.pipeline);
        tokio::spawn(async move {
            if let Some(report) = pipeline.run_cycle().await.report() {
                info!(
                    fetched = report.fetched,
                    saved = report.saved,
                    errors = report.errors.len(),
                    "startup ingestion finished"
                );
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, sources = config.sources().len(), "listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    scheduler.await?;
    repository.close().await;

    Ok(())
}
