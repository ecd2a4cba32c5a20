// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand and cancellation control between two adjacent stages.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Demand value meaning "no limit".
pub const UNBOUNDED: u64 = u64::MAX;

/// Back-pressure and cancellation handle handed to a subscriber in `on_subscribe`.
///
/// Both methods may be called from any thread, including re-entrantly from inside
/// the subscriber's own `on_next`.
pub trait Subscription: Send + Sync {
    /// Adds `n` to the outstanding demand. Demand is additive and saturates at
    /// [`UNBOUNDED`]. `request(0)` is a protocol violation that the producer
    /// reports as an error signal.
    fn request(&self, n: u64);

    /// Stops the flow of signals. Idempotent; after it returns no further signal
    /// is emitted for this subscription.
    fn cancel(&self);
}

/// Shared handle to a subscription.
pub type SharedSubscription = Arc<dyn Subscription>;

/// Adds `n` to `requested`, saturating at [`UNBOUNDED`]. Returns the previous value.
pub fn add_demand(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = current.saturating_add(n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(previous) => return previous,
            Err(actual) => current = actual,
        }
    }
}

/// Subtracts `n` delivered items from `requested` unless demand is unbounded.
/// Returns the remaining demand.
pub fn produced(requested: &AtomicU64, n: u64) -> u64 {
    let mut current = requested.load(Ordering::Acquire);
    loop {
        if current == UNBOUNDED {
            return UNBOUNDED;
        }
        let next = current.saturating_sub(n);
        match requested.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return next,
            Err(actual) => current = actual,
        }
    }
}

/// A subscription that ignores demand and cancellation.
///
/// Handed to subscribers of sequences that terminate immediately without a real producer.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}
