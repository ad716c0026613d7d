use std::sync::Arc;

use chrono::{DateTime, Duration, Local};

use crate::domain::traits::TaskCallback;

/// A task run by the scheduler, periodically or at fixed instants
#[derive(Clone)]
pub struct ScheduledTask {
    pub id: String,
    pub every: Option<Duration>,
    pub at: Vec<DateTime<Local>>,
    /// Remaining runs; `None` runs forever
    pub count: Option<u32>,
    pub callback: Arc<dyn TaskCallback>,
    last_run: Option<DateTime<Local>>,
    last_checked: Option<DateTime<Local>>,
}

impl ScheduledTask {
    pub fn new<C: TaskCallback + 'static>(id: impl Into<String>, callback: C) -> Self {
        Self {
            id: id.into(),
            every: None,
            at: Vec::new(),
            count: None,
            callback: Arc::new(callback),
            last_run: None,
            last_checked: None,
        }
    }

    pub fn every(mut self, interval: Duration) -> Self {
        self.every = Some(interval);
        self
    }

    pub fn at(mut self, time: DateTime<Local>) -> Self {
        self.at.push(time);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.count == Some(0)
    }

    pub fn last_run(&self) -> Option<DateTime<Local>> {
        self.last_run
    }

    /// Checks whether the task is due at `now`, recording the run if it is
    pub fn can_run(&mut self, now: DateTime<Local>) -> bool {
        if self.is_exhausted() {
            return false;
        }

        let previous_check = self.last_checked.replace(now);
        let hit_fixed_time = self.at.iter().any(|t| match previous_check {
            Some(prev) => *t > prev && *t <= now,
            None => *t == now,
        });

        let due = hit_fixed_time
            || match (self.every, self.last_run) {
                (Some(_), None) => true,
                (Some(every), Some(last)) => last + every <= now,
                (None, _) => false,
            };

        if due {
            self.last_run = Some(now);
            if let Some(count) = self.count.as_mut() {
                *count -= 1;
            }
        }

        due
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("every", &self.every)
            .field("at", &self.at)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
