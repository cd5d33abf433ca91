use crate::jobs::{JobRegistry, Schedule};
use tokio::{
    signal,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

/// Runs every registered job on its own interval until cancelled.
pub struct Scheduler {
    registry: JobRegistry,
    shutdown_token: CancellationToken,
}

impl Scheduler {
    pub fn new(registry: JobRegistry, shutdown_token: CancellationToken) -> Self {
        Self {
            registry,
            shutdown_token,
        }
    }

    /// Spawn one loop per job. The first run of each job happens one period
    /// after start.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        info!(jobs = ?self.registry.registered_kinds(), "starting scheduler");

        self.registry
            .schedules()
            .iter()
            .cloned()
            .map(|schedule| {
                let shutdown_token = self.shutdown_token.clone();
                let kind = schedule.handler.kind();
                tokio::spawn(
                    run_loop(schedule, shutdown_token).instrument(info_span!("job", kind = kind)),
                )
            })
            .collect()
    }

    /// Spawn the loops and wait until they have all stopped.
    pub async fn run(self) {
        let handles = self.spawn();
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Job loop panicked: {}", e);
            }
        }
        info!("Scheduler stopped");
    }
}

async fn run_loop(schedule: Schedule, shutdown_token: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + schedule.every, schedule.every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                info!("Job loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = schedule.handler.run().await {
                    error!(error = %e, "Job run failed");
                }
            }
        }
    }
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal, initiating graceful shutdown...");
        token.cancel();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobHandler;
    use async_trait::async_trait;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    #[derive(Clone)]
    struct CountingJob {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl JobHandler for CountingJob {
        async fn run(&self) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }

        fn kind(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_jobs_repeat_until_cancelled() {
        let ok_runs = Arc::new(AtomicUsize::new(0));
        let failing_runs = Arc::new(AtomicUsize::new(0));

        let mut registry = JobRegistry::new();
        registry.register(
            CountingJob {
                runs: ok_runs.clone(),
                fail: false,
            },
            Duration::from_millis(20),
        );
        registry.register(
            CountingJob {
                runs: failing_runs.clone(),
                fail: true,
            },
            Duration::from_millis(20),
        );

        let token = CancellationToken::new();
        let scheduler = tokio::spawn(Scheduler::new(registry, token.clone()).run());

        tokio::time::sleep(Duration::from_millis(150)).await;
        token.cancel();
        scheduler.await.unwrap();

        assert!(ok_runs.load(Ordering::SeqCst) >= 2);
        // failures don't stop the loop
        assert!(failing_runs.load(Ordering::SeqCst) >= 2);

        let after = ok_runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(ok_runs.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn test_first_run_waits_one_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = JobRegistry::new();
        registry.register(
            CountingJob {
                runs: runs.clone(),
                fail: false,
            },
            Duration::from_secs(3600),
        );

        let token = CancellationToken::new();
        let handles = Scheduler::new(registry, token.clone()).spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
