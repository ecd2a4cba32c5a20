// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::PullSource;
use reflux_core::{RefluxError, Signal};
use std::sync::Arc;

/// At most one signal, then completion.
pub(crate) struct OnceSource<T> {
    pending: Option<Signal<T>>,
}

impl<T> OnceSource<T> {
    pub(crate) fn value(value: T) -> Self {
        Self {
            pending: Some(Signal::Value(value)),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            pending: Some(Signal::Complete),
        }
    }

    pub(crate) fn error(error: RefluxError) -> Self {
        Self {
            pending: Some(Signal::Error(error)),
        }
    }
}

impl<T: Send> PullSource<T> for OnceSource<T> {
    fn pull(&mut self) -> Signal<T> {
        self.pending.take().unwrap_or(Signal::Complete)
    }

    fn terminal(&mut self) -> Option<Signal<T>> {
        match &self.pending {
            None => Some(Signal::Complete),
            Some(Signal::Value(_)) => None,
            Some(_) => self.pending.take(),
        }
    }
}

pub(crate) type Supplier<T> = Arc<dyn Fn() -> Result<Option<T>, RefluxError> + Send + Sync>;

/// Calls a supplier on first demand and emits its outcome.
pub(crate) struct CallableSource<T> {
    supplier: Supplier<T>,
    called: bool,
}

impl<T> CallableSource<T> {
    pub(crate) fn new(supplier: Supplier<T>) -> Self {
        Self {
            supplier,
            called: false,
        }
    }
}

impl<T: Send> PullSource<T> for CallableSource<T> {
    fn pull(&mut self) -> Signal<T> {
        self.called = true;
        match (self.supplier)() {
            Ok(Some(value)) => Signal::Value(value),
            Ok(None) => Signal::Complete,
            Err(error) => Signal::Error(error),
        }
    }

    fn terminal(&mut self) -> Option<Signal<T>> {
        self.called.then_some(Signal::Complete)
    }
}
