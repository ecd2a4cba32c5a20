// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::continue_strategy::ContinueStrategy;
use crate::error::RefluxError;
use crate::subscription::SharedSubscription;

/// Receiving end of a subscription.
///
/// The engine guarantees the call sequence
/// `on_subscribe (on_next)* (on_error | on_complete)?` and never calls two
/// methods of the same subscriber concurrently.
pub trait Subscriber<T>: Send {
    /// Called exactly once, before any other signal.
    fn on_subscribe(&mut self, subscription: SharedSubscription);

    /// Called for each value, never more often than requested.
    fn on_next(&mut self, value: T);

    /// Terminal failure.
    fn on_error(&mut self, error: RefluxError);

    /// Terminal success.
    fn on_complete(&mut self);

    /// Error-continue capability of this subscriber and everything downstream of it.
    ///
    /// Upstream stages that can drop a failing element and keep going query this
    /// once, at subscribe time. Stages that neither handle nor alter the capability
    /// must forward their downstream's answer.
    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        None
    }
}

/// Owned, type-erased subscriber.
pub type BoxSubscriber<T> = Box<dyn Subscriber<T>>;

impl<T> Subscriber<T> for BoxSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        (**self).on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        (**self).on_next(value);
    }

    fn on_error(&mut self, error: RefluxError) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        (**self).continue_strategy()
    }
}
