// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core protocol types for the reflux reactive-streams engine.
//!
//! This crate defines the contract every stage speaks: a [`Publisher`] describes a
//! sequence, a [`Subscriber`] receives it, and the [`Subscription`] between them
//! carries demand and cancellation. Values and terminal events travel as
//! [`Signal`]s; failures are always [`RefluxError`] values delivered in-band.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod cancellation_token;
pub mod continue_strategy;
pub mod disposable;
pub mod error;
pub mod fault;
pub mod hooks;
pub mod publisher;
pub mod signal;
pub mod subscriber;
pub mod subscription;

pub use self::cancellation_token::CancellationToken;
pub use self::continue_strategy::{
    Continuation, ContinueHandler, ContinueStrategy, ErrorPredicate,
};
pub use self::disposable::{DeliveryGate, Disposable};
pub use self::error::{IntoRefluxError, RefluxError, Result, ResultExt, SharedError};
pub use self::publisher::{Publisher, SharedPublisher};
pub use self::signal::Signal;
pub use self::subscriber::{BoxSubscriber, Subscriber};
pub use self::subscription::{
    add_demand, produced, EmptySubscription, SharedSubscription, Subscription, UNBOUNDED,
};
