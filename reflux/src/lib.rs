// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Reflux
//!
//! A Reactive-Streams engine: lazy, re-playable publishers of zero, one or many
//! values, with backpressure, cancellation, structured error recovery and
//! hand-off to worker schedulers.
//!
//! ## Overview
//!
//! - [`Flux`] and [`Mono`] describe a pipeline. Nothing runs until a subscriber
//!   attaches, and every subscription gets its own execution state.
//! - Demand flows upstream with `request(n)`; values flow downstream only within
//!   that demand. `cancel()` silences a subscription for good.
//! - Errors travel downstream until a recovery stage (`on_error_return*`,
//!   `on_error_resume`, `on_error_continue*`) or the subscriber's error callback
//!   consumes them.
//! - [`Scheduler`] owns named worker lanes; `publish_on` and `delay_elements`
//!   move delivery onto them.
//!
//! ## Quick Start
//!
//! ```rust
//! use reflux_rx::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let received = Arc::new(Mutex::new(Vec::new()));
//! let sink = received.clone();
//!
//! Flux::range(1, 5)
//!     .map(|i| i * 10)
//!     .on_error_return(-1)
//!     .subscribe(move |v| sink.lock().unwrap().push(v));
//!
//! assert_eq!(*received.lock().unwrap(), vec![10, 20, 30, 40, 50]);
//! ```
//!
//! ## Crates
//!
//! - `reflux-core` - protocol traits, `Signal`, `RefluxError`, hooks, `Disposable`
//! - `reflux-scheduler` - worker-lane schedulers
//! - `reflux-publisher` - `Flux`, `Mono` and their operators
//! - `reflux-publisher-time` - `delay_elements`

// Re-export the protocol
pub use reflux_core::{
    hooks, BoxSubscriber, ContinueStrategy, Disposable, IntoRefluxError, Publisher, RefluxError,
    Result, ResultExt, SharedPublisher, SharedSubscription, Signal, Subscriber, Subscription,
    UNBOUNDED,
};

// Re-export the publishers
pub use reflux_publisher::{Flux, Mono, SyncSink, DEFAULT_PREFETCH};

// Re-export scheduling
pub use reflux_publisher_time::DelayElementsExt;
pub use reflux_scheduler::{ScheduledTask, Scheduler, SchedulerConfig, Worker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DelayElementsExt, Disposable, Flux, Mono, Publisher, RefluxError, Scheduler, Signal,
        Subscriber, Subscription, SyncSink, UNBOUNDED,
    };
}
