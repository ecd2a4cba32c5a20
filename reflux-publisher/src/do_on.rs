// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Side-effect taps.
//!
//! All `do_on_*` operators and `log` share one stage holding a set of optional hooks.
//! Hooks run synchronously on the delivery path before the signal moves on. A hook
//! that panics on a signal path replaces the signal with an error and cancels
//! upstream; a hook that panics on the request or cancel path is reported through
//! [`hooks::on_error_dropped`].

use reflux_core::fault::catch_fault;
use reflux_core::{
    hooks, BoxSubscriber, ContinueStrategy, EmptySubscription, Publisher, RefluxError,
    SharedPublisher, SharedSubscription, Subscriber, Subscription,
};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) type SubscribeHook = Arc<dyn Fn(&dyn Subscription) + Send + Sync>;
pub(crate) type RequestHook = Arc<dyn Fn(u64) + Send + Sync>;
pub(crate) type NextHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub(crate) type ErrorHook = Arc<dyn Fn(&RefluxError) + Send + Sync>;
pub(crate) type SignalHook = Arc<dyn Fn() + Send + Sync>;
pub(crate) type SuccessHook<T> = Arc<dyn Fn(Option<&T>) + Send + Sync>;

/// Hook set of one tap stage. Unset hooks cost nothing.
pub(crate) struct PeekHooks<T> {
    pub(crate) on_subscribe: Option<SubscribeHook>,
    pub(crate) on_request: Option<RequestHook>,
    pub(crate) on_next: Option<NextHook<T>>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) on_complete: Option<SignalHook>,
    pub(crate) on_cancel: Option<SignalHook>,
    pub(crate) on_success: Option<SuccessHook<T>>,
}

impl<T> Default for PeekHooks<T> {
    fn default() -> Self {
        Self {
            on_subscribe: None,
            on_request: None,
            on_next: None,
            on_error: None,
            on_complete: None,
            on_cancel: None,
            on_success: None,
        }
    }
}

impl<T> Clone for PeekHooks<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: self.on_subscribe.clone(),
            on_request: self.on_request.clone(),
            on_next: self.on_next.clone(),
            on_error: self.on_error.clone(),
            on_complete: self.on_complete.clone(),
            on_cancel: self.on_cancel.clone(),
            on_success: self.on_success.clone(),
        }
    }
}

impl<T: Debug + 'static> PeekHooks<T> {
    /// Hooks logging every signal under `category`.
    pub(crate) fn logging(category: impl Into<String>) -> Self {
        let category: Arc<str> = Arc::from(category.into());
        let on_subscribe = category.clone();
        let on_request = category.clone();
        let on_next = category.clone();
        let on_error = category.clone();
        let on_complete = category.clone();
        let on_cancel = category;

        Self {
            on_subscribe: Some(Arc::new(move |_: &dyn Subscription| info!("{} | onSubscribe()", on_subscribe))),
            on_request: Some(Arc::new(move |n: u64| {
                if n == u64::MAX {
                    info!("{} | request(unbounded)", on_request);
                } else {
                    info!("{} | request({})", on_request, n);
                }
            })),
            on_next: Some(Arc::new(move |value: &T| {
                info!("{} | onNext({:?})", on_next, value);
            })),
            on_error: Some(Arc::new(move |error: &RefluxError| {
                error!("{} | onError({})", on_error, error);
            })),
            on_complete: Some(Arc::new(move || info!("{} | onComplete()", on_complete))),
            on_cancel: Some(Arc::new(move || info!("{} | cancel()", on_cancel))),
            on_success: None,
        }
    }
}

pub(crate) fn peek_stage<T>(source: SharedPublisher<T>, hooks: PeekHooks<T>) -> SharedPublisher<T>
where
    T: Send + 'static,
{
    Arc::new(PeekPublisher {
        source,
        hooks: Arc::new(hooks),
    })
}

struct PeekPublisher<T> {
    source: SharedPublisher<T>,
    hooks: Arc<PeekHooks<T>>,
}

impl<T: Send + 'static> Publisher<T> for PeekPublisher<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        self.source.attach(Box::new(PeekSubscriber {
            downstream,
            hooks: self.hooks.clone(),
            upstream: None,
            done: false,
            succeeded: false,
        }));
    }
}

struct PeekSubscriber<T> {
    downstream: BoxSubscriber<T>,
    hooks: Arc<PeekHooks<T>>,
    upstream: Option<SharedSubscription>,
    done: bool,
    succeeded: bool,
}

impl<T: Send + 'static> PeekSubscriber<T> {
    fn fail(&mut self, fault: RefluxError) {
        self.done = true;
        if let Some(upstream) = self.upstream.take() {
            upstream.cancel();
        }
        self.downstream.on_error(fault);
    }
}

impl<T: Send + 'static> Subscriber<T> for PeekSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        if let Some(hook) = &self.hooks.on_subscribe {
            if let Err(fault) = catch_fault(|| hook(&*subscription)) {
                subscription.cancel();
                self.done = true;
                self.downstream.on_subscribe(Arc::new(EmptySubscription));
                self.downstream.on_error(fault);
                return;
            }
        }

        self.upstream = Some(subscription.clone());
        if self.hooks.on_request.is_some() || self.hooks.on_cancel.is_some() {
            self.downstream.on_subscribe(Arc::new(PeekSubscription {
                upstream: subscription,
                hooks: self.hooks.clone(),
                cancelled: AtomicBool::new(false),
            }));
        } else {
            self.downstream.on_subscribe(subscription);
        }
    }

    fn on_next(&mut self, value: T) {
        if self.done {
            hooks::on_next_dropped("do_on");
            return;
        }

        if let Some(hook) = &self.hooks.on_next {
            if let Err(fault) = catch_fault(|| hook(&value)) {
                self.fail(fault);
                return;
            }
        }

        if !self.succeeded {
            self.succeeded = true;
            if let Some(hook) = &self.hooks.on_success {
                if let Err(fault) = catch_fault(|| hook(Some(&value))) {
                    self.fail(fault);
                    return;
                }
            }
        }

        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: RefluxError) {
        if self.done {
            hooks::on_error_dropped(&error);
            return;
        }
        self.done = true;

        if let Some(hook) = &self.hooks.on_error {
            if let Err(fault) = catch_fault(|| hook(&error)) {
                hooks::on_error_dropped(&fault);
            }
        }
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        if self.done {
            return;
        }
        self.done = true;

        if !self.succeeded {
            if let Some(hook) = &self.hooks.on_success {
                if let Err(fault) = catch_fault(|| hook(None)) {
                    self.downstream.on_error(fault);
                    return;
                }
            }
        }

        if let Some(hook) = &self.hooks.on_complete {
            if let Err(fault) = catch_fault(|| hook()) {
                self.downstream.on_error(fault);
                return;
            }
        }
        self.downstream.on_complete();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        self.downstream.continue_strategy()
    }
}

struct PeekSubscription<T> {
    upstream: SharedSubscription,
    hooks: Arc<PeekHooks<T>>,
    cancelled: AtomicBool,
}

impl<T: Send + 'static> Subscription for PeekSubscription<T> {
    fn request(&self, n: u64) {
        if let Some(hook) = &self.hooks.on_request {
            if let Err(fault) = catch_fault(|| hook(n)) {
                hooks::on_error_dropped(&fault);
            }
        }
        self.upstream.request(n);
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(hook) = &self.hooks.on_cancel {
            if let Err(fault) = catch_fault(|| hook()) {
                hooks::on_error_dropped(&fault);
            }
        }
        self.upstream.cancel();
    }
}
