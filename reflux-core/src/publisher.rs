// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriber::BoxSubscriber;
use std::sync::Arc;

/// A cold, reusable description of a sequence of signals.
///
/// `attach` must not fail synchronously: every failure, including one while
/// setting up the execution, is reported to the subscriber as an error signal
/// after `on_subscribe`. Each call builds fresh execution state, so two
/// subscribers never share counters, buffers or timers.
pub trait Publisher<T>: Send + Sync {
    /// Starts a new, independent execution delivering to `subscriber`.
    fn attach(&self, subscriber: BoxSubscriber<T>);
}

/// Shared handle to a publisher stage.
pub type SharedPublisher<T> = Arc<dyn Publisher<T>>;

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn attach(&self, subscriber: BoxSubscriber<T>) {
        (**self).attach(subscriber);
    }
}
