// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::SchedulerConfig;
use crate::lane::{Command, Delayed, Job, Lane, Rejection};
use crate::task::ScheduledTask;
use reflux_core::{CancellationToken, RefluxError, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static PARALLEL: OnceLock<Scheduler> = OnceLock::new();

/// Cheaply cloneable handle to a pool of worker lanes.
///
/// Lanes live until the scheduler is disposed, explicitly or when the last handle
/// (including handles kept by [`Worker`]s) is dropped.
///
/// ```
/// use reflux_scheduler::Scheduler;
/// use std::sync::mpsc;
///
/// let scheduler = Scheduler::new_worker_pool("docs", 2);
/// let worker = scheduler.create_worker();
/// let (tx, rx) = mpsc::channel();
///
/// worker
///     .schedule(move || {
///         let _ = tx.send(std::thread::current().name().map(str::to_string));
///     })
///     .unwrap();
///
/// let lane = rx.recv().unwrap().unwrap();
/// assert!(lane.starts_with("docs-"));
/// scheduler.dispose();
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    name: String,
    lanes: Vec<Arc<Lane>>,
    next: AtomicUsize,
    disposed: AtomicBool,
    shared: bool,
}

impl Scheduler {
    /// Pool of `size` lanes named `{name}-1` .. `{name}-{size}`.
    pub fn new_worker_pool(name: impl Into<String>, size: usize) -> Self {
        Self::with_config(SchedulerConfig::new(name).with_size(size))
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::build(&config, false)
    }

    /// Process-wide pool with one lane per available CPU.
    ///
    /// Disposing this scheduler is ignored.
    pub fn parallel() -> Self {
        PARALLEL
            .get_or_init(|| Self::build(&SchedulerConfig::new("parallel"), true))
            .clone()
    }

    fn build(config: &SchedulerConfig, shared: bool) -> Self {
        let lanes = (1..=config.size())
            .filter_map(|index| {
                let lane_name = format!("{}-{}", config.name(), index);
                match Lane::spawn(config.name(), lane_name, config.queue_capacity()) {
                    Ok(lane) => Some(Arc::new(lane)),
                    Err(e) => {
                        error!("scheduler {}: failed to start lane: {}", config.name(), e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        info!(
            "scheduler {} started with {} lanes",
            config.name(),
            lanes.len()
        );

        Self {
            inner: Arc::new(SchedulerInner {
                name: config.name().to_string(),
                lanes,
                next: AtomicUsize::new(0),
                disposed: AtomicBool::new(false),
                shared,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of running lanes.
    pub fn size(&self) -> usize {
        self.inner.lanes.len()
    }

    /// Picks the next lane round-robin and returns a sticky handle to it.
    pub fn create_worker(&self) -> Worker {
        let lanes = &self.inner.lanes;
        let lane = if lanes.is_empty() {
            None
        } else {
            let index = self.inner.next.fetch_add(1, Ordering::Relaxed) % lanes.len();
            Some(lanes[index].clone())
        };

        Worker {
            scheduler: self.inner.clone(),
            lane,
        }
    }

    /// Runs `job` on the next lane.
    ///
    /// # Errors
    ///
    /// `SchedulerRejected` when the scheduler is disposed or the lane queue is full.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.create_worker().schedule(job)
    }

    /// Stops accepting work and lets every lane thread exit once its queue drains.
    ///
    /// Does not wait for the lanes. Delayed jobs still pending never run: those
    /// submitted with [`Worker::schedule_after_or_reject`] get their rejection handler
    /// called on the lane instead.
    pub fn dispose(&self) {
        if self.inner.shared {
            warn!("scheduler {}: dispose ignored on shared scheduler", self.inner.name);
            return;
        }
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

impl SchedulerInner {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        for lane in &self.lanes {
            lane.close();
        }
        info!("scheduler {} disposed", self.name);
    }

    fn rejected(&self, reason: &str) -> RefluxError {
        RefluxError::scheduler_rejected(&self.name, reason)
    }
}

impl Drop for SchedulerInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.inner.name)
            .field("lanes", &self.inner.lanes.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Sticky handle to one lane of a [`Scheduler`].
///
/// Immediate jobs submitted through the same worker run one at a time, in order.
#[derive(Clone)]
pub struct Worker {
    scheduler: Arc<SchedulerInner>,
    lane: Option<Arc<Lane>>,
}

impl Worker {
    /// Runs `job` on this worker's lane.
    ///
    /// # Errors
    ///
    /// `SchedulerRejected` when the scheduler is disposed or the lane queue is full.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        let lane = self.lane()?;
        lane.submit(Command::Run(Box::new(job) as Job))
    }

    /// Runs `job` on this worker's lane after `delay`.
    ///
    /// # Errors
    ///
    /// `SchedulerRejected` when the scheduler is disposed or the lane queue is full.
    pub fn schedule_after(
        &self,
        delay: Duration,
        job: impl FnOnce() + Send + 'static,
    ) -> Result<ScheduledTask> {
        self.submit_delayed(delay, Box::new(job), None)
    }

    /// Like [`schedule_after`](Self::schedule_after), but if the scheduler is disposed
    /// before the delay elapses, `on_reject` runs on the lane with `SchedulerRejected`
    /// instead of `job`. Neither runs once the returned task is cancelled.
    ///
    /// # Errors
    ///
    /// `SchedulerRejected` when the scheduler is disposed or the lane queue is full;
    /// `on_reject` is not called in that case.
    pub fn schedule_after_or_reject(
        &self,
        delay: Duration,
        job: impl FnOnce() + Send + 'static,
        on_reject: impl FnOnce(RefluxError) + Send + 'static,
    ) -> Result<ScheduledTask> {
        self.submit_delayed(delay, Box::new(job), Some(Box::new(on_reject)))
    }

    fn submit_delayed(
        &self,
        delay: Duration,
        job: Job,
        on_reject: Option<Rejection>,
    ) -> Result<ScheduledTask> {
        let lane = self.lane()?;
        let token = CancellationToken::new();
        lane.submit(Command::RunAfter(Delayed {
            delay,
            job,
            on_reject,
            token: token.clone(),
        }))?;
        Ok(ScheduledTask::new(token))
    }

    /// Thread name of the lane this worker is bound to.
    pub fn lane_name(&self) -> Option<&str> {
        self.lane.as_deref().map(Lane::name)
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.disposed.load(Ordering::Acquire)
    }

    fn lane(&self) -> Result<&Lane> {
        if self.is_disposed() {
            return Err(self.scheduler.rejected("scheduler disposed"));
        }
        self.lane
            .as_deref()
            .ok_or_else(|| self.scheduler.rejected("no running lanes"))
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("scheduler", &self.scheduler.name)
            .field("lane", &self.lane_name())
            .finish()
    }
}
