// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting the commonly used types.
//!
//! ```
//! use reflux_publisher::prelude::*;
//!
//! let disposable = Flux::range(1, 3).subscribe(|_| {});
//! assert!(disposable.is_terminated());
//! ```

pub use crate::{Flux, Mono, SyncSink};
pub use reflux_core::{
    Disposable, Publisher, RefluxError, Signal, Subscriber, Subscription, UNBOUNDED,
};
pub use reflux_scheduler::Scheduler;
