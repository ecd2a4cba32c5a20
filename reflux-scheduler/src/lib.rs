// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Worker-lane schedulers.
//!
//! A [`Scheduler`] owns a fixed set of lanes. Each lane is a named OS thread driving a
//! single-threaded tokio runtime, fed through a multi-producer channel. Stages that hand
//! off execution obtain a [`Worker`] (a sticky handle to one lane) and submit jobs or
//! delayed jobs to it; everything submitted to one worker runs sequentially, in
//! submission order for immediate jobs.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

mod lane;

pub mod config;
pub mod scheduler;
pub mod task;

pub use self::config::SchedulerConfig;
pub use self::lane::{Job, Rejection};
pub use self::scheduler::{Scheduler, Worker};
pub use self::task::ScheduledTask;
