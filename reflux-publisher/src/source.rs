// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pull-driven sources.
//!
//! Every source is a [`PullSource`] driven by a [`PullSubscription`]. The subscription
//! owns the demand counter and a work-in-progress counter: whichever thread moves the
//! counter from zero becomes the only drainer, and any `request` or `cancel` issued
//! meanwhile (including re-entrantly from `on_next`) only records its effect for the
//! active drainer to pick up. Delivery is therefore depth-first, never recursive and
//! never blocked on a lock held by the caller.

pub(crate) mod generate;
pub(crate) mod once;
pub(crate) mod range;
pub(crate) mod sequence;

use parking_lot::Mutex;
use reflux_core::fault::catch_fault;
use reflux_core::{
    add_demand, produced, BoxSubscriber, EmptySubscription, Publisher, RefluxError,
    SharedPublisher, Signal, Subscriber, Subscription,
};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-subscription producer state of a source.
pub(crate) trait PullSource<T>: Send {
    /// Produces the next signal. Only called while there is outstanding demand.
    fn pull(&mut self) -> Signal<T>;

    /// A terminal signal that can be delivered without demand, if one is due.
    fn terminal(&mut self) -> Option<Signal<T>> {
        None
    }

    /// Releases per-subscription resources. Called once, on termination or cancellation.
    fn release(&mut self) {}
}

/// Publisher creating a fresh [`PullSource`] for every subscription.
pub(crate) struct PullPublisher<T, F> {
    factory: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> PullPublisher<T, F> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

impl<T, S, F> Publisher<T> for PullPublisher<T, F>
where
    T: Send + 'static,
    S: PullSource<T> + 'static,
    F: Fn() -> S + Send + Sync,
{
    fn attach(&self, mut subscriber: BoxSubscriber<T>) {
        match catch_fault(&self.factory) {
            Ok(source) => PullSubscription::start(source, subscriber),
            Err(error) => {
                subscriber.on_subscribe(Arc::new(EmptySubscription));
                subscriber.on_error(error);
            }
        }
    }
}

struct PullState<T, S> {
    source: S,
    subscriber: Option<BoxSubscriber<T>>,
    done: bool,
}

/// Demand-driven delivery loop shared by all sources.
pub(crate) struct PullSubscription<T, S> {
    requested: AtomicU64,
    wip: AtomicUsize,
    cancelled: AtomicBool,
    bad_request: AtomicBool,
    state: Mutex<PullState<T, S>>,
}

impl<T, S> PullSubscription<T, S>
where
    T: Send + 'static,
    S: PullSource<T> + 'static,
{
    fn start(source: S, mut subscriber: BoxSubscriber<T>) {
        // Starts with wip held so requests made inside on_subscribe are only recorded.
        let subscription = Arc::new(Self {
            requested: AtomicU64::new(0),
            wip: AtomicUsize::new(1),
            cancelled: AtomicBool::new(false),
            bad_request: AtomicBool::new(false),
            state: Mutex::new(PullState {
                source,
                subscriber: None,
                done: false,
            }),
        });

        subscriber.on_subscribe(subscription.clone());
        subscription.state.lock().subscriber = Some(subscriber);
        subscription.drain_loop();
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }
        self.drain_loop();
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            self.drain_once();
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn drain_once(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.done {
            return;
        }

        loop {
            if self.cancelled.load(Ordering::Acquire) {
                state.finish();
                return;
            }

            if self.bad_request.load(Ordering::Acquire) {
                let error = RefluxError::protocol_violation("request(n) called with n == 0");
                warn!("source: {}", error);
                state.finish_with(Signal::Error(error));
                return;
            }

            let terminal = catch_fault(|| state.source.terminal()).unwrap_or_else(|e| Some(Signal::Error(e)));
            if let Some(terminal) = terminal {
                state.finish_with(terminal);
                return;
            }

            if self.requested.load(Ordering::Acquire) == 0 {
                return;
            }

            let signal = catch_fault(|| state.source.pull()).unwrap_or_else(Signal::Error);
            match signal {
                Signal::Value(value) => {
                    produced(&self.requested, 1);
                    if let Some(subscriber) = state.subscriber.as_mut() {
                        subscriber.on_next(value);
                    }
                }
                terminal => {
                    state.finish_with(terminal);
                    return;
                }
            }
        }
    }
}

impl<T, S: PullSource<T>> PullState<T, S> {
    fn finish(&mut self) {
        self.done = true;
        self.source.release();
        self.subscriber = None;
    }

    fn finish_with(&mut self, terminal: Signal<T>) {
        self.done = true;
        self.source.release();
        if let Some(mut subscriber) = self.subscriber.take() {
            terminal.deliver(&mut subscriber);
        }
    }
}

impl<T, S> Subscription for PullSubscription<T, S>
where
    T: Send + 'static,
    S: PullSource<T> + 'static,
{
    fn request(&self, n: u64) {
        if n == 0 {
            self.bad_request.store(true, Ordering::Release);
        } else {
            add_demand(&self.requested, n);
        }
        self.drain();
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.drain();
        }
    }
}

pub(crate) fn just<T>(value: T) -> SharedPublisher<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(PullPublisher::new(move || once::OnceSource::value(value.clone())))
}

pub(crate) fn empty<T: Send + 'static>() -> SharedPublisher<T> {
    Arc::new(PullPublisher::new(once::OnceSource::empty))
}

pub(crate) fn error<T: Send + 'static>(error: RefluxError) -> SharedPublisher<T> {
    Arc::new(PullPublisher::new(move || once::OnceSource::error(error.clone())))
}

pub(crate) fn callable<T, F>(supplier: F) -> SharedPublisher<T>
where
    T: Send + 'static,
    F: Fn() -> Result<Option<T>, RefluxError> + Send + Sync + 'static,
{
    let supplier: once::Supplier<T> = Arc::new(supplier);
    Arc::new(PullPublisher::new(move || once::CallableSource::new(supplier.clone())))
}

pub(crate) fn range(start: i64, count: u64) -> SharedPublisher<i64> {
    Arc::new(PullPublisher::new(move || range::RangeSource::new(start, count)))
}

pub(crate) fn from_sequence<I>(items: I) -> SharedPublisher<I::Item>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    Arc::new(PullPublisher::new(move || {
        sequence::SequenceSource::new(items.clone().into_iter())
    }))
}

pub(crate) fn generate<S, T, I>(
    init: I,
    step: generate::StepFn<S, T>,
    cleanup: Option<generate::CleanupFn<S>>,
) -> SharedPublisher<T>
where
    S: Send + 'static,
    T: Send + 'static,
    I: Fn() -> S + Send + Sync + 'static,
{
    Arc::new(PullPublisher::new(move || {
        generate::GenerateSource::new(init(), step.clone(), cleanup.clone())
    }))
}
