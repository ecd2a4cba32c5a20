// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::do_on::PeekHooks;
use crate::flux::Flux;
use crate::source;
use reflux_core::{RefluxError, SharedPublisher};
use std::sync::Arc;

/// A cold publisher of at most one value followed by completion, or an error.
///
/// ```
/// use reflux_publisher::Mono;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(None));
/// let sink = seen.clone();
///
/// Mono::just("asd")
///     .do_on_success(|v| assert_eq!(v, Some(&"asd")))
///     .subscribe(move |v| *sink.lock().unwrap() = Some(v));
///
/// assert_eq!(*seen.lock().unwrap(), Some("asd"));
/// ```
#[must_use = "a Mono does nothing until subscribed"]
pub struct Mono<T> {
    publisher: SharedPublisher<T>,
}

impl<T: Send + 'static> Mono<T> {
    pub(crate) fn from_shared(publisher: SharedPublisher<T>) -> Self {
        Self { publisher }
    }

    /// Emits `value`, then completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_shared(source::just(value))
    }

    /// Emits `value` if present, then completes.
    pub fn just_or_empty(value: Option<T>) -> Self
    where
        T: Clone + Sync,
    {
        match value {
            Some(value) => Self::just(value),
            None => Self::empty(),
        }
    }

    /// Completes without emitting.
    pub fn empty() -> Self {
        Self::from_shared(source::empty())
    }

    /// Fails immediately with `error`.
    pub fn error(error: RefluxError) -> Self {
        Self::from_shared(source::error(error))
    }

    /// Calls `supplier` on first demand of each subscription and emits its outcome:
    /// `Ok(Some(v))` emits `v`, `Ok(None)` completes empty, `Err(e)` fails. A panic
    /// becomes a `CallbackPanic` error.
    pub fn from_callable<F>(supplier: F) -> Self
    where
        F: Fn() -> Result<Option<T>, RefluxError> + Send + Sync + 'static,
    {
        Self::from_shared(source::callable(supplier))
    }

    /// Runs `hook` with the value on success, or `None` on empty completion.
    pub fn do_on_success<F>(self, hook: F) -> Self
    where
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        self.peek(PeekHooks {
            on_success: Some(Arc::new(hook)),
            ..Default::default()
        })
    }

    /// Views this `Mono` as a `Flux`.
    pub fn flux(self) -> Flux<T> {
        Flux::from_shared(self.publisher)
    }
}

define_shared_operators!(Mono);
