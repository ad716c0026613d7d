//! Task scheduler - runs extension tasks once they are due

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::state::BotState;
use crate::domain::traits::TaskCallback;

pub struct TaskScheduler {
    state: Arc<BotState>,
    period: Duration,
}

impl TaskScheduler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self {
            state,
            period: Duration::from_secs(1),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Runs the scheduler loop on a separate task until `shutdown` turns true
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.period);
        tracing::debug!(target: "scheduler", "Task scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(Local::now()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(target: "scheduler", "Task scheduler stopped");
    }

    /// Runs the tasks due at `now`; returns how many ran
    pub async fn tick(&self, now: DateTime<Local>) -> usize {
        let due = self.collect_due(now);
        let count = due.len();

        for (id, callback) in due {
            if let Err(e) = callback.run(self.state.clone()).await {
                tracing::error!(target: "scheduler", "Task `{}` failed: {}", id, e);
            }
        }

        count
    }

    fn collect_due(&self, now: DateTime<Local>) -> Vec<(String, Arc<dyn TaskCallback>)> {
        match self.state.loader_mut() {
            Ok(mut loader) => loader.due_tasks(now),
            Err(e) => {
                tracing::error!(target: "scheduler", "{}", e);
                Vec::new()
            }
        }
    }
}
