// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-based operators for reflux publishers.
//!
//! # Overview
//!
//! - **`DelayElementsExt`** - Extension trait for `.delay_elements(duration)` and
//!   `.delay_elements_on(duration, scheduler)`
//!
//! Delays run on a [`Scheduler`](reflux_scheduler::Scheduler) worker. Each
//! subscription sticks to one worker, so its values are re-emitted in order on a
//! single lane thread.
//!
//! # Example
//!
//! ```rust
//! use reflux_publisher::Flux;
//! use reflux_publisher_time::prelude::*;
//! use reflux_test_utils::StepVerifier;
//! use std::time::Duration;
//!
//! let delayed = Flux::range(1, 3).delay_elements(Duration::from_millis(10));
//!
//! StepVerifier::create(delayed)
//!     .expect_next_all([1, 2, 3])
//!     .verify_complete()
//!     .unwrap();
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

mod delay_elements;

pub mod prelude;

pub use self::delay_elements::DelayElementsExt;
