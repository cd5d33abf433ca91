pub mod report;

pub use report::{CycleOutcome, CycleReport, SourceFailure};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use rand::Rng;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    config::{FeedSource, FetchSettings},
    fetcher::{FeedFetcher, SourceError},
    normalizer::{ingestion_time, normalize},
    repositories::ArticleStore,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SourceTally {
    fetched: usize,
    saved: usize,
}

/// Fetch, normalise and store every configured source.
pub struct IngestionPipeline {
    store: Arc<dyn ArticleStore>,
    fetcher: Arc<dyn FeedFetcher>,
    sources: Vec<FeedSource>,
    concurrency: usize,
    delay: Duration,
    running: AtomicBool,
}

/// Releases the re-entrancy flag when the cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        fetcher: Arc<dyn FeedFetcher>,
        sources: Vec<FeedSource>,
        settings: &FetchSettings,
    ) -> Self {
        Self {
            store,
            fetcher,
            sources,
            concurrency: settings.concurrency.max(1),
            delay: settings.delay,
            running: AtomicBool::new(false),
        }
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one cycle. Partial failure is reported, never returned as an error.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("ingestion cycle already running, skipping");
            return CycleOutcome::AlreadyRunning;
        }
        let _guard = RunningGuard(&self.running);

        let cycle_id = Uuid::new_v4();
        let report = self
            .collect()
            .instrument(info_span!("ingest_cycle", cycle_id = %cycle_id))
            .await;

        CycleOutcome::Completed(report)
    }

    async fn collect(&self) -> CycleReport {
        let now = ingestion_time();
        info!(sources = self.sources.len(), "ingestion cycle started");

        // Owned sources keep the cycle future `Send` for spawned callers.
        let results: Vec<(FeedSource, Result<SourceTally, SourceError>)> =
            stream::iter(self.sources.iter().cloned())
                .map(|source| async move {
                    let result = self
                        .ingest_source(&source, now)
                        .instrument(info_span!("source", name = %source.name))
                        .await;
                    (source, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut report = CycleReport {
            fetched: 0,
            saved: 0,
            errors: Vec::new(),
            timestamp: now,
        };

        for (source, result) in results {
            match result {
                Ok(tally) => {
                    report.fetched += tally.fetched;
                    report.saved += tally.saved;
                }
                Err(e) => {
                    warn!(
                        source = %source.name,
                        error = %e,
                        retriable = e.should_retry(),
                        "source unavailable"
                    );
                    report.errors.push(SourceFailure {
                        source: source.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            fetched = report.fetched,
            saved = report.saved,
            failed_sources = report.errors.len(),
            "ingestion cycle finished"
        );
        report
    }

    async fn ingest_source(
        &self,
        source: &FeedSource,
        now: DateTime<Utc>,
    ) -> Result<SourceTally, SourceError> {
        self.courtesy_delay().await;

        let items = self.fetcher.fetch(source).await?;
        let mut tally = SourceTally::default();

        for item in &items {
            let article = match normalize(item, source, now) {
                Ok(article) => article,
                Err(e) => {
                    warn!(error = %e, link = ?item.link, "skipping feed item");
                    continue;
                }
            };
            tally.fetched += 1;

            match self.store.insert_ignore_duplicate(&article).await {
                Ok(true) => tally.saved += 1,
                Ok(false) => debug!(link = %article.link, "already ingested"),
                Err(e) => warn!(error = %e, link = %article.link, "failed to store article"),
            }
        }

        debug!(items = items.len(), saved = tally.saved, "source ingested");
        Ok(tally)
    }

    async fn courtesy_delay(&self) {
        if self.delay.is_zero() {
            return;
        }
        let base = self.delay.as_millis() as u64;
        let jitter = rand::thread_rng().gen_range(0..=base / 2);
        tokio::time::sleep(Duration::from_millis(base + jitter)).await;
    }
}
