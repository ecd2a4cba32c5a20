// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::num::NonZeroUsize;
use std::thread;

/// Construction parameters of a [`Scheduler`](crate::Scheduler).
///
/// ```
/// use reflux_scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::new("pub-parallel")
///     .with_size(4)
///     .with_queue_capacity(1024);
///
/// assert_eq!(config.name(), "pub-parallel");
/// assert_eq!(config.size(), 4);
/// assert_eq!(config.queue_capacity(), Some(1024));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    name: String,
    size: usize,
    queue_capacity: Option<usize>,
}

impl SchedulerConfig {
    /// One lane per available CPU, unbounded lane queues.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: available_lanes(),
            queue_capacity: None,
        }
    }

    /// Number of lanes. Zero is raised to one.
    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size.max(1);
        self
    }

    /// Maximum number of queued jobs per lane. Submissions beyond it are rejected.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity.max(1));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn queue_capacity(&self) -> Option<usize> {
        self.queue_capacity
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new("reflux")
    }
}

pub(crate) fn available_lanes() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
