// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A recording subscriber with manual demand control.

use parking_lot::{Condvar, Mutex, MutexGuard};
use reflux_core::{Publisher, RefluxError, SharedSubscription, Signal, Subscriber};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Records every signal a publisher delivers and lets the test drive demand.
///
/// Signals are kept in arrival order together with the name of the thread that
/// delivered them. Protocol breaches observed by the probe (a second
/// `on_subscribe`, anything after a terminal signal) are collected in
/// [`violations`](Self::violations) instead of panicking on a foreign thread.
///
/// # Example
///
/// ```rust
/// use reflux_publisher::Flux;
/// use reflux_test_utils::TestProbe;
/// use std::time::Duration;
///
/// let probe = TestProbe::attach_with_request(&Flux::range(1, 3), u64::MAX);
///
/// assert!(probe.await_terminal(Duration::from_secs(1)));
/// assert_eq!(probe.values(), vec![1, 2, 3]);
/// assert!(probe.is_completed());
/// ```
pub struct TestProbe<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    state: Mutex<ProbeState<T>>,
    changed: Condvar,
}

struct ProbeState<T> {
    subscription: Option<SharedSubscription>,
    subscribe_count: usize,
    signals: Vec<Signal<T>>,
    threads: Vec<Option<String>>,
    terminated: bool,
    violations: Vec<String>,
}

impl<T> Default for ProbeState<T> {
    fn default() -> Self {
        Self {
            subscription: None,
            subscribe_count: 0,
            signals: Vec::new(),
            threads: Vec::new(),
            terminated: false,
            violations: Vec::new(),
        }
    }
}

impl<T: Send + 'static> TestProbe<T> {
    /// A probe that is not attached to anything yet; see [`subscriber`](Self::subscriber).
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ProbeState::default()),
                changed: Condvar::new(),
            }),
        }
    }

    /// Subscribes a new probe to `publisher` without requesting anything.
    pub fn attach<P>(publisher: &P) -> Self
    where
        P: Publisher<T> + ?Sized,
    {
        Self::attach_with_request(publisher, 0)
    }

    /// Subscribes a new probe to `publisher` and requests `initial` on subscribe.
    pub fn attach_with_request<P>(publisher: &P, initial: u64) -> Self
    where
        P: Publisher<T> + ?Sized,
    {
        let probe = Self::new();
        publisher.attach(Box::new(probe.subscriber(initial)));
        probe
    }

    /// The subscriber half, requesting `initial` from `on_subscribe` when non-zero.
    pub fn subscriber(&self, initial: u64) -> ProbeSubscriber<T> {
        ProbeSubscriber {
            shared: self.shared.clone(),
            initial,
        }
    }
}

impl<T> TestProbe<T> {
    fn state(&self) -> MutexGuard<'_, ProbeState<T>> {
        self.shared.state.lock()
    }

    fn subscription(&self) -> Option<SharedSubscription> {
        self.state().subscription.clone()
    }

    /// Requests `n` more values. Does nothing before `on_subscribe`.
    pub fn request(&self, n: u64) {
        if let Some(subscription) = self.subscription() {
            subscription.request(n);
        }
    }

    /// Cancels the subscription. Does nothing before `on_subscribe`.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription() {
            subscription.cancel();
        }
    }

    /// `true` once `on_subscribe` was received.
    pub fn is_subscribed(&self) -> bool {
        self.state().subscribe_count > 0
    }

    /// Number of signals received so far, terminal signal included.
    pub fn signal_count(&self) -> usize {
        self.state().signals.len()
    }

    /// Number of values received so far.
    pub fn value_count(&self) -> usize {
        self.state().signals.iter().filter(|s| s.is_value()).count()
    }

    /// `true` once a terminal signal was received.
    pub fn is_terminated(&self) -> bool {
        self.state().terminated
    }

    /// `true` if the sequence completed.
    pub fn is_completed(&self) -> bool {
        self.state().signals.iter().any(Signal::is_complete)
    }

    /// The error the sequence failed with, if any.
    pub fn error(&self) -> Option<RefluxError> {
        self.state().signals.iter().find_map(|signal| match signal {
            Signal::Error(error) => Some(error.clone()),
            _ => None,
        })
    }

    /// Number of error signals received. More than one is a protocol breach.
    pub fn error_count(&self) -> usize {
        self.state().signals.iter().filter(|s| s.is_error()).count()
    }

    /// Runs `f` on the signal at `index`, if it arrived.
    pub fn inspect<R>(&self, index: usize, f: impl FnOnce(&Signal<T>) -> R) -> Option<R> {
        self.state().signals.get(index).map(f)
    }

    /// Names of the threads that delivered each signal, in arrival order.
    pub fn delivery_threads(&self) -> Vec<Option<String>> {
        self.state().threads.clone()
    }

    /// Protocol breaches observed so far.
    pub fn violations(&self) -> Vec<String> {
        self.state().violations.clone()
    }

    /// Waits until at least `count` signals arrived or the sequence terminated.
    ///
    /// Returns `true` if `count` signals are available.
    pub fn await_count(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state();
        while state.signals.len() < count && !state.terminated {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.signals.len() >= count
    }

    /// Waits for a terminal signal. Returns `true` if one arrived in time.
    pub fn await_terminal(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state();
        while !state.terminated {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.terminated
    }
}

impl<T: Clone> TestProbe<T> {
    /// All signals received so far.
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.state().signals.clone()
    }

    /// All values received so far.
    pub fn values(&self) -> Vec<T> {
        self.state()
            .signals
            .iter()
            .filter_map(|signal| signal.value().cloned())
            .collect()
    }
}

impl<T: Send + 'static> Default for TestProbe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TestProbe<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Subscriber half of a [`TestProbe`].
pub struct ProbeSubscriber<T> {
    shared: Arc<Shared<T>>,
    initial: u64,
}

impl<T> ProbeSubscriber<T> {
    fn record(&self, signal: Signal<T>) {
        let mut state = self.shared.state.lock();
        if state.terminated {
            let kind = match &signal {
                Signal::Value(_) => "value",
                Signal::Error(_) => "error",
                Signal::Complete => "complete",
            };
            state.violations.push(format!("{kind} after terminal signal"));
        } else if state.subscribe_count == 0 {
            state.violations.push("signal before on_subscribe".to_string());
        }
        state.terminated |= signal.is_terminal();
        state.signals.push(signal);
        state.threads.push(thread::current().name().map(str::to_string));
        drop(state);
        self.shared.changed.notify_all();
    }
}

impl<T: Send> Subscriber<T> for ProbeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        let mut state = self.shared.state.lock();
        state.subscribe_count += 1;
        if state.subscribe_count > 1 {
            state.violations.push("on_subscribe called twice".to_string());
            drop(state);
            subscription.cancel();
            return;
        }
        state.subscription = Some(subscription.clone());
        drop(state);
        self.shared.changed.notify_all();

        if self.initial > 0 {
            subscription.request(self.initial);
        }
    }

    fn on_next(&mut self, value: T) {
        self.record(Signal::Value(value));
    }

    fn on_error(&mut self, error: RefluxError) {
        self.record(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        self.record(Signal::Complete);
    }
}
