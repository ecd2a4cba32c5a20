// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{
    BoxSubscriber, ContinueHandler, ContinueStrategy, ErrorPredicate, Publisher, RefluxError,
    SharedPublisher, SharedSubscription, Subscriber,
};
use std::sync::Arc;

/// Builds a stage that offers `handler` to the element-level stages upstream of it.
///
/// The stage itself forwards every signal unchanged; it only contributes to the
/// [`ContinueStrategy`] those stages look up when they are subscribed.
pub(crate) fn on_error_continue_stage<T>(
    source: SharedPublisher<T>,
    predicate: ErrorPredicate,
    handler: ContinueHandler,
) -> SharedPublisher<T>
where
    T: Send + 'static,
{
    Arc::new(OnErrorContinuePublisher {
        source,
        predicate,
        handler,
    })
}

struct OnErrorContinuePublisher<T> {
    source: SharedPublisher<T>,
    predicate: ErrorPredicate,
    handler: ContinueHandler,
}

impl<T: Send + 'static> Publisher<T> for OnErrorContinuePublisher<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        let strategy = ContinueStrategy::new(
            self.predicate.clone(),
            self.handler.clone(),
            downstream.continue_strategy(),
        );
        self.source.attach(Box::new(OnErrorContinueSubscriber {
            downstream,
            strategy,
        }));
    }
}

struct OnErrorContinueSubscriber<T> {
    downstream: BoxSubscriber<T>,
    strategy: ContinueStrategy,
}

impl<T: Send + 'static> Subscriber<T> for OnErrorContinueSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: RefluxError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        Some(self.strategy.clone())
    }
}
