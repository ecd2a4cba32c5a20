// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error recovery by switching to a fallback publisher.
//!
//! `on_error_return` and its filtered variants are fallback publishers emitting a
//! single value. The hand-over goes through a [`SubscriptionArbiter`], which keeps
//! track of the demand the downstream issued but the failed upstream never
//! satisfied, and replays exactly that demand on the fallback.

use parking_lot::Mutex;
use reflux_core::fault::catch_fault;
use reflux_core::{
    hooks, BoxSubscriber, ContinueStrategy, Publisher, RefluxError, SharedPublisher,
    SharedSubscription, Subscriber, Subscription, UNBOUNDED,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Chooses the fallback for an error; `None` lets the error through.
pub(crate) type Fallback<T> =
    Arc<dyn Fn(&RefluxError) -> Option<SharedPublisher<T>> + Send + Sync>;

pub(crate) fn on_error_resume_stage<T>(
    source: SharedPublisher<T>,
    fallback: Fallback<T>,
) -> SharedPublisher<T>
where
    T: Send + 'static,
{
    Arc::new(ResumePublisher { source, fallback })
}

struct ResumePublisher<T> {
    source: SharedPublisher<T>,
    fallback: Fallback<T>,
}

impl<T: Send + 'static> Publisher<T> for ResumePublisher<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        self.source.attach(Box::new(ResumeSubscriber {
            downstream: Some(downstream),
            arbiter: Arc::new(SubscriptionArbiter::default()),
            fallback: Some(self.fallback.clone()),
            subscribed: false,
        }));
    }
}

/// Subscription handed downstream that can be re-pointed at a new upstream.
#[derive(Default)]
pub(crate) struct SubscriptionArbiter {
    state: Mutex<ArbiterState>,
    cancelled: AtomicBool,
}

#[derive(Default)]
struct ArbiterState {
    current: Option<SharedSubscription>,
    requested: u64,
}

impl SubscriptionArbiter {
    /// Switches to `subscription`, forwarding the demand still outstanding.
    pub(crate) fn set(&self, subscription: SharedSubscription) {
        if self.cancelled.load(Ordering::Acquire) {
            subscription.cancel();
            return;
        }

        let outstanding = {
            let mut state = self.state.lock();
            state.current = Some(subscription.clone());
            state.requested
        };

        if outstanding > 0 {
            subscription.request(outstanding);
        }

        // cancel() may have run before the swap.
        if self.cancelled.load(Ordering::Acquire) {
            subscription.cancel();
        }
    }

    pub(crate) fn produced(&self, n: u64) {
        let mut state = self.state.lock();
        if state.requested != UNBOUNDED {
            state.requested = state.requested.saturating_sub(n);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Subscription for SubscriptionArbiter {
    fn request(&self, n: u64) {
        let current = {
            let mut state = self.state.lock();
            state.requested = state.requested.saturating_add(n);
            state.current.clone()
        };
        if let Some(current) = current {
            current.request(n);
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let current = self.state.lock().current.take();
        if let Some(current) = current {
            current.cancel();
        }
    }
}

struct ResumeSubscriber<T> {
    downstream: Option<BoxSubscriber<T>>,
    arbiter: Arc<SubscriptionArbiter>,
    // Taken on the first recovery: at most one fallback per subscription.
    fallback: Option<Fallback<T>>,
    subscribed: bool,
}

impl<T: Send + 'static> Subscriber<T> for ResumeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        self.arbiter.set(subscription);
        if !self.subscribed {
            self.subscribed = true;
            if let Some(downstream) = self.downstream.as_mut() {
                downstream.on_subscribe(self.arbiter.clone());
            }
        }
    }

    fn on_next(&mut self, value: T) {
        match self.downstream.as_mut() {
            Some(downstream) => {
                self.arbiter.produced(1);
                downstream.on_next(value);
            }
            None => hooks::on_next_dropped("on_error_resume"),
        }
    }

    fn on_error(&mut self, error: RefluxError) {
        let Some(mut downstream) = self.downstream.take() else {
            hooks::on_error_dropped(&error);
            return;
        };

        let Some(fallback) = self.fallback.take() else {
            downstream.on_error(error);
            return;
        };

        match catch_fault(|| fallback(&error)) {
            Ok(Some(publisher)) if !self.arbiter.is_cancelled() => {
                debug!("on_error_resume: switching to fallback after: {}", error);
                publisher.attach(Box::new(ResumeSubscriber {
                    downstream: Some(downstream),
                    arbiter: self.arbiter.clone(),
                    fallback: None,
                    subscribed: true,
                }));
            }
            Ok(Some(_)) => {}
            Ok(None) => downstream.on_error(error),
            Err(fault) => downstream.on_error(fault),
        }
    }

    fn on_complete(&mut self) {
        if let Some(mut downstream) = self.downstream.take() {
            downstream.on_complete();
        }
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        self.downstream
            .as_ref()
            .and_then(|downstream| downstream.continue_strategy())
    }
}
