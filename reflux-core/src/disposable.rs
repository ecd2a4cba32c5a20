// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Caller-facing cancellation handle of a top-level subscription.
//!
//! A [`Disposable`] shares a [`DeliveryGate`] with the consumer it controls. Every
//! delivery to user callbacks passes through the gate, which makes cancellation
//! race-safe: once [`Disposable::cancel`] returns, a delivery that was already
//! running on another thread has finished and no new one can start, even if a
//! timer or worker task is still in flight.

use crate::subscription::SharedSubscription;
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Serializes deliveries against cancellation for one subscription.
#[derive(Default)]
pub struct DeliveryGate {
    cancelled: AtomicBool,
    terminated: AtomicBool,
    upstream: Mutex<Option<SharedSubscription>>,
    // Re-entrant so a callback may cancel its own subscription.
    delivery: ReentrantMutex<()>,
}

impl DeliveryGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the subscription to cancel. Returns `false` (and cancels
    /// `subscription` right away) if the gate was cancelled first.
    pub fn set_upstream(&self, subscription: SharedSubscription) -> bool {
        let mut upstream = self.upstream.lock();
        if self.cancelled.load(Ordering::Acquire) || upstream.is_some() {
            drop(upstream);
            subscription.cancel();
            return false;
        }
        *upstream = Some(subscription);
        true
    }

    /// Runs `deliver` unless the gate is cancelled or terminated.
    pub fn deliver<R>(&self, deliver: impl FnOnce() -> R) -> Option<R> {
        let _delivering = self.delivery.lock();
        if self.is_closed() {
            return None;
        }
        Some(deliver())
    }

    /// Runs a terminal delivery and closes the gate. At most one terminal
    /// delivery ever runs.
    pub fn deliver_terminal<R>(&self, deliver: impl FnOnce() -> R) -> Option<R> {
        let _delivering = self.delivery.lock();
        if self.cancelled.load(Ordering::Acquire) || self.terminated.swap(true, Ordering::AcqRel) {
            return None;
        }
        self.upstream.lock().take();
        Some(deliver())
    }

    /// Cancels upstream and waits for an in-flight delivery to finish.
    ///
    /// Idempotent. Returns `true` for the call that performed the cancellation.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        let upstream = self.upstream.lock().take();
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
        // Wait out a delivery running on another thread.
        drop(self.delivery.lock());
        true
    }

    /// `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `true` once a terminal signal has been delivered.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// `true` when no further delivery will happen.
    pub fn is_closed(&self) -> bool {
        self.is_cancelled() || self.is_terminated()
    }
}

impl fmt::Debug for DeliveryGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryGate")
            .field("cancelled", &self.is_cancelled())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

/// Cancellation handle returned by the top-level `subscribe` calls.
///
/// Cloning yields another handle to the same subscription.
///
/// ```
/// use reflux_core::{DeliveryGate, Disposable};
/// use std::sync::Arc;
///
/// let gate = Arc::new(DeliveryGate::new());
/// let disposable = Disposable::new(gate.clone());
///
/// disposable.cancel();
/// disposable.cancel();
/// assert!(disposable.is_cancelled());
/// assert_eq!(gate.deliver(|| 1), None);
/// ```
#[derive(Clone, Debug)]
pub struct Disposable {
    gate: Arc<DeliveryGate>,
}

impl Disposable {
    /// Wraps the gate shared with a consumer.
    pub fn new(gate: Arc<DeliveryGate>) -> Self {
        Self { gate }
    }

    /// Cancels the subscription. Idempotent.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }

    /// `true` once the subscription delivered its terminal signal.
    pub fn is_terminated(&self) -> bool {
        self.gate.is_terminated()
    }

    /// `true` if cancelled or terminated.
    pub fn is_disposed(&self) -> bool {
        self.gate.is_closed()
    }
}
