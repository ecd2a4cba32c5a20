// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::fault::catch_fault;
use reflux_core::{
    hooks, BoxSubscriber, Continuation, ContinueStrategy, Publisher, RefluxError, SharedPublisher,
    SharedSubscription, Subscriber,
};
use std::sync::Arc;

pub(crate) type Mapper<T, U> = Arc<dyn Fn(T) -> Result<U, RefluxError> + Send + Sync>;

/// Builds a mapping stage over `source`.
///
/// A failing element either terminates the sequence or, when a downstream
/// `on_error_continue` accepts the error, is dropped and replaced by requesting one
/// more element from upstream.
pub(crate) fn map_stage<T, U>(source: SharedPublisher<T>, mapper: Mapper<T, U>) -> SharedPublisher<U>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
{
    Arc::new(MapPublisher { source, mapper })
}

struct MapPublisher<T, U> {
    source: SharedPublisher<T>,
    mapper: Mapper<T, U>,
}

impl<T, U> Publisher<U> for MapPublisher<T, U>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
{
    fn attach(&self, downstream: BoxSubscriber<U>) {
        let strategy = downstream.continue_strategy();
        self.source.attach(Box::new(MapSubscriber {
            downstream,
            mapper: self.mapper.clone(),
            strategy,
            upstream: None,
            done: false,
        }));
    }
}

struct MapSubscriber<T, U> {
    downstream: BoxSubscriber<U>,
    mapper: Mapper<T, U>,
    strategy: Option<ContinueStrategy>,
    upstream: Option<SharedSubscription>,
    done: bool,
}

impl<T, U> MapSubscriber<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn fail(&mut self, error: RefluxError, element: Option<T>) {
        let outcome = match (&self.strategy, &element) {
            (Some(strategy), Some(element)) => strategy.try_continue(&error, element),
            _ => Continuation::Unhandled,
        };

        match outcome {
            Continuation::Resumed => {
                debug!("map: element dropped after recoverable error: {}", error);
                if let Some(upstream) = &self.upstream {
                    upstream.request(1);
                }
            }
            Continuation::Unhandled => self.terminate(error),
            Continuation::Failed(fault) => self.terminate(fault),
        }
    }

    fn terminate(&mut self, error: RefluxError) {
        self.done = true;
        if let Some(upstream) = self.upstream.take() {
            upstream.cancel();
        }
        self.downstream.on_error(error);
    }
}

impl<T, U> Subscriber<T> for MapSubscriber<T, U>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.done {
            hooks::on_next_dropped("map");
            return;
        }

        // The raw element is only kept when a continue handler may need it.
        let element = self.strategy.as_ref().map(|_| value.clone());
        let mapper = &self.mapper;
        match catch_fault(|| mapper(value)).and_then(|result| result) {
            Ok(mapped) => self.downstream.on_next(mapped),
            Err(error) => self.fail(error, element),
        }
    }

    fn on_error(&mut self, error: RefluxError) {
        if self.done {
            hooks::on_error_dropped(&error);
            return;
        }
        self.done = true;
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.downstream.on_complete();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        self.strategy.clone()
    }
}
