use feedwire::{config::Config, repositories::ArticleRepository, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    // runs all pending migrations; no-op if up-to-date
    let repository = ArticleRepository::open(config.database_url()).await?;
    repository.close().await;

    Ok(())
}
