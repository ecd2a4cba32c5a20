// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::source;
use crate::source::generate::SyncSink;
use crate::strict::strict_stage;
use reflux_core::{Publisher, RefluxError, SharedPublisher};
use std::sync::Arc;

/// A cold publisher of zero or more values followed by completion or an error.
///
/// A `Flux` is only a description: nothing runs until it is subscribed, and every
/// subscription gets its own independent execution. Operators consume `self` and
/// return a new description, leaving clones of the original untouched.
///
/// ```
/// use reflux_publisher::Flux;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
///
/// Flux::range(1, 5)
///     .map(|i| i * 10)
///     .subscribe(move |v| sink.lock().unwrap().push(v));
///
/// assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30, 40, 50]);
/// ```
#[must_use = "a Flux does nothing until subscribed"]
pub struct Flux<T> {
    publisher: SharedPublisher<T>,
}

impl<T: Send + 'static> Flux<T> {
    pub(crate) fn from_shared(publisher: SharedPublisher<T>) -> Self {
        Self { publisher }
    }

    /// Adopts a hand-written publisher.
    ///
    /// The publisher is held to the protocol: a value pushed without outstanding
    /// demand becomes a `ProtocolViolation` error and cancels it, and signals after
    /// termination are reported as dropped.
    pub fn from_publisher<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self::from_shared(strict_stage(publisher))
    }

    /// Emits `value`, then completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_shared(source::just(value))
    }

    /// Emits every element of `values` in order, then completes.
    ///
    /// ```
    /// use reflux_publisher::Flux;
    /// use reflux_test_utils::StepVerifier;
    ///
    /// StepVerifier::create(Flux::just_all(["a", "b", "c"]))
    ///     .expect_next_all(["a", "b", "c"])
    ///     .verify_complete()
    ///     .unwrap();
    /// ```
    pub fn just_all<const N: usize>(values: [T; N]) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_sequence(values)
    }

    /// Completes without emitting.
    pub fn empty() -> Self {
        Self::from_shared(source::empty())
    }

    /// Fails immediately with `error`.
    pub fn error(error: RefluxError) -> Self {
        Self::from_shared(source::error(error))
    }

    /// Emits the items of `items` in order, then completes.
    ///
    /// Each subscription iterates its own clone of `items`, one item per unit of demand.
    pub fn from_sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Self::from_shared(source::from_sequence(items))
    }

    /// Pull-based generator: `step` runs once per requested value with the state
    /// returned by the previous run, starting from `init()` for each subscription.
    ///
    /// See [`SyncSink`] for what one invocation may emit.
    pub fn generate<S, I, F>(init: I, step: F) -> Self
    where
        S: Send + 'static,
        I: Fn() -> S + Send + Sync + 'static,
        F: Fn(S, &mut SyncSink<T>) -> S + Send + Sync + 'static,
    {
        Self::from_shared(source::generate(init, Arc::new(step), None))
    }

    /// [`generate`](Self::generate) with a `cleanup` consuming the final state once,
    /// on termination or cancellation.
    pub fn generate_with_cleanup<S, I, F, C>(init: I, step: F, cleanup: C) -> Self
    where
        S: Send + 'static,
        I: Fn() -> S + Send + Sync + 'static,
        F: Fn(S, &mut SyncSink<T>) -> S + Send + Sync + 'static,
        C: Fn(S) + Send + Sync + 'static,
    {
        Self::from_shared(source::generate(
            init,
            Arc::new(step),
            Some(Arc::new(cleanup)),
        ))
    }
}

impl Flux<i64> {
    /// Emits `count` consecutive integers starting at `start`, then completes.
    ///
    /// Fails on subscribe if the last value would overflow `i64`.
    pub fn range(start: i64, count: u64) -> Self {
        Self::from_shared(source::range(start, count))
    }
}

define_shared_operators!(Flux);
