use crate::jobs::JobHandler;
use std::{sync::Arc, time::Duration};

/// A handler and how often it runs.
#[derive(Clone)]
pub struct Schedule {
    pub handler: Arc<dyn JobHandler>,
    pub every: Duration,
}

/// Registry of periodic jobs
#[derive(Default, Clone)]
pub struct JobRegistry {
    schedules: Vec<Schedule>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job to run every `every`. A zero period disables the job.
    pub fn register<H: JobHandler>(&mut self, handler: H, every: Duration) {
        if every.is_zero() {
            return;
        }
        self.schedules.push(Schedule {
            handler: Arc::new(handler),
            every,
        });
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// Get all registered job kinds
    pub fn registered_kinds(&self) -> Vec<&'static str> {
        self.schedules.iter().map(|s| s.handler.kind()).collect()
    }
}
