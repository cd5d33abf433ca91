use async_trait::async_trait;

/// A unit of periodic work.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// Execute one run of the job
    async fn run(&self) -> anyhow::Result<()>;

    /// Name used in logs
    fn kind(&self) -> &'static str;
}
