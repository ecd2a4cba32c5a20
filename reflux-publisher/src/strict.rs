// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Protocol enforcement around publishers written outside this crate.

use reflux_core::{
    add_demand, hooks, produced, BoxSubscriber, ContinueStrategy, Publisher, RefluxError,
    SharedPublisher, SharedSubscription, Subscriber, Subscription,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) fn strict_stage<T, P>(publisher: P) -> SharedPublisher<T>
where
    T: Send + 'static,
    P: Publisher<T> + 'static,
{
    Arc::new(StrictPublisher {
        source: Arc::new(publisher),
    })
}

struct StrictPublisher<T> {
    source: SharedPublisher<T>,
}

impl<T: Send + 'static> Publisher<T> for StrictPublisher<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        self.source.attach(Box::new(StrictSubscriber {
            downstream,
            subscription: None,
            done: false,
        }));
    }
}

/// Tracks downstream demand so values pushed without it can be caught.
struct DemandSubscription {
    upstream: SharedSubscription,
    requested: AtomicU64,
}

impl Subscription for DemandSubscription {
    fn request(&self, n: u64) {
        add_demand(&self.requested, n);
        self.upstream.request(n);
    }

    fn cancel(&self) {
        self.upstream.cancel();
    }
}

struct StrictSubscriber<T> {
    downstream: BoxSubscriber<T>,
    subscription: Option<Arc<DemandSubscription>>,
    done: bool,
}

impl<T: Send + 'static> StrictSubscriber<T> {
    fn violate(&mut self, context: &str) {
        let error = RefluxError::protocol_violation(context);
        warn!("from_publisher: {}", error);
        self.done = true;
        if let Some(subscription) = &self.subscription {
            subscription.cancel();
        }
        self.downstream.on_error(error);
    }
}

impl<T: Send + 'static> Subscriber<T> for StrictSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        if self.subscription.is_some() {
            warn!("from_publisher: duplicate on_subscribe, cancelling the new subscription");
            subscription.cancel();
            return;
        }

        let tracked = Arc::new(DemandSubscription {
            upstream: subscription,
            requested: AtomicU64::new(0),
        });
        self.subscription = Some(tracked.clone());
        self.downstream.on_subscribe(tracked);
    }

    fn on_next(&mut self, value: T) {
        if self.done {
            hooks::on_next_dropped("from_publisher");
            return;
        }

        let Some(subscription) = &self.subscription else {
            self.violate("on_next before on_subscribe");
            return;
        };

        if subscription.requested.load(Ordering::Acquire) == 0 {
            self.violate("value emitted without outstanding demand");
            return;
        }
        produced(&subscription.requested, 1);
        self.downstream.on_next(value);
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
            debug!("from_publisher: on_complete after termination ignored");
            return;
        }
        self.done = true;
        self.downstream.on_complete();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        self.downstream.continue_strategy()
    }
}
