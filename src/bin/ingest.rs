//! Run a single ingestion cycle and print the report as JSON.

use anyhow::Result;
use feedwire::{
    app_state::AppState, config::Config, repositories::ArticleRepository, telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let repository = ArticleRepository::open(config.database_url()).await?;
    let state = AppState::from_config(&config, repository.clone())?;

    let report = state
        .pipeline
        .run_cycle()
        .await
        .report()
        .ok_or_else(|| anyhow::anyhow!("an ingestion cycle is already running"))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    repository.close().await;

    Ok(())
}
