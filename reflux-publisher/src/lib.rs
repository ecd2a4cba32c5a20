// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Flux and Mono publishers.
//!
//! [`Flux`] describes zero or more values, [`Mono`] at most one. Both are cold,
//! re-playable descriptions built from sources and operators; subscribing walks
//! the chain from consumer to source, creating one subscriber per stage, after which
//! values flow towards the consumer while demand and cancellation flow back.
//!
//! # Operator Categories
//!
//! - **Sources**: [`Flux::range`], [`Flux::from_sequence`], [`Flux::generate`],
//!   [`Flux::just`], [`Mono::just`], [`Mono::from_callable`], `empty`, `error`
//! - **Transformation**: `map`, `try_map`
//! - **Side effects**: `do_on_subscribe`, `do_on_request`, `do_on_next`,
//!   `do_on_error`, `do_on_complete`, `do_on_cancel`, [`Mono::do_on_success`], `log`
//! - **Recovery**: `on_error_return`, `on_error_return_if`, `on_error_return_kind`,
//!   `on_error_resume`, `on_error_continue`, `on_error_continue_if`,
//!   `on_error_continue_kind`
//! - **Scheduling**: `publish_on`, `publish_on_with_prefetch`
//! - **Consumption**: `subscribe`, `subscribe_with_error`, `subscribe_with_complete`,
//!   `subscribe_with`
//!
//! # Error recovery
//!
//! Errors travel as signals and end the sequence. `on_error_return*` and
//! `on_error_resume` replace that ending with a fallback. `on_error_continue*` instead
//! lets mapping stages upstream of it drop a failing element and keep going:
//!
//! ```
//! use reflux_publisher::Flux;
//! use reflux_core::RefluxError;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! Flux::from_sequence(vec!["a", "b", "c", "d"])
//!     .try_map(|s| {
//!         if s == "c" {
//!             Err(RefluxError::stream_error("no c"))
//!         } else {
//!             Ok(s.to_uppercase())
//!         }
//!     })
//!     .on_error_continue(|_err, _element| {})
//!     .subscribe(move |v| sink.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["A", "B", "D"]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

#[macro_use]
mod operators;

mod do_on;
mod map;
mod on_error_continue;
mod on_error_return;
mod source;
mod strict;
mod subscribe;

pub mod flux;
pub mod mono;
pub mod prelude;
pub mod publish_on;

pub use self::flux::Flux;
pub use self::mono::Mono;
pub use self::publish_on::DEFAULT_PREFETCH;
pub use self::source::generate::SyncSink;
