// src/services/scheduler.rs
//! Per-widget polling.
//!
//! Each widget asks the [`Scheduler`] for its own cadence and holds the
//! returned [`ScheduledTask`]. Dropping the guard cancels the timer.

use futures::future::BoxFuture;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Shortest accepted period, tokio intervals cannot tick at zero.
pub const MIN_PERIOD: Duration = Duration::from_millis(100);

pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Scheduler
    }

    /// Run `job` now and then every `period`.
    ///
    /// Every run is spawned on its own so a slow fetch never delays the next
    /// tick. Overlapping runs are expected, the stores drop stale results.
    pub fn every<F>(&self, name: &str, period: Duration, job: F) -> ScheduledTask
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let job: Job = Arc::new(job);
        let task_name = name.to_string();
        let period = if period < MIN_PERIOD {
            warn!("Period {:?} for {} is too short, using {:?}", period, task_name, MIN_PERIOD);
            MIN_PERIOD
        } else {
            period
        };
        info!("Scheduling {} every {:?}", task_name, period);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Running scheduled job {}", task_name);
                tokio::spawn((job)());
            }
        });

        ScheduledTask {
            name: name.to_string(),
            period,
            handle: Some(handle),
        }
    }
}

/// Guard of one schedule. The timer stops when this is dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    name: String,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped schedule {}", self.name);
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}
