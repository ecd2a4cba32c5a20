// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{BoxSubscriber, Publisher, RefluxError, Subscription};
use reflux_publisher::Flux;
use reflux_test_utils::{StepVerifier, TestProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingSubscription {
    cancels: AtomicUsize,
}

impl Subscription for CountingSubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pushes `count` values and completes right after `on_subscribe`, ignoring demand.
struct Pushing {
    count: i32,
    subscription: Arc<CountingSubscription>,
}

impl Pushing {
    fn new(count: i32) -> Self {
        Self {
            count,
            subscription: Arc::new(CountingSubscription::default()),
        }
    }
}

impl Publisher<i32> for Pushing {
    fn attach(&self, mut subscriber: BoxSubscriber<i32>) {
        subscriber.on_subscribe(self.subscription.clone());
        for value in 0..self.count {
            subscriber.on_next(value);
        }
        subscriber.on_complete();
        subscriber.on_error(RefluxError::stream_error("after completion"));
    }
}

#[test]
fn test_values_within_demand_pass() -> anyhow::Result<()> {
    StepVerifier::create_with_request(Flux::from_publisher(Pushing::new(3)), 3)
        .expect_next_all([0, 1, 2])
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_value_without_demand_is_a_protocol_violation() {
    // Arrange
    let publisher = Pushing::new(3);
    let subscription = publisher.subscription.clone();

    // Act
    let probe = TestProbe::attach_with_request(&Flux::from_publisher(publisher), 2);

    // Assert
    assert_eq!(probe.values(), vec![0, 1]);
    assert!(matches!(
        probe.error(),
        Some(RefluxError::ProtocolViolation { .. })
    ));
    assert_eq!(subscription.cancels.load(Ordering::SeqCst), 1);
    assert!(probe.violations().is_empty());
}

#[test]
fn test_signals_after_termination_never_reach_downstream() {
    // Act
    let probe = TestProbe::attach_with_request(&Flux::from_publisher(Pushing::new(0)), 1);

    // Assert
    assert!(probe.is_completed());
    assert_eq!(probe.signal_count(), 1);
    assert!(probe.violations().is_empty());
}

#[test]
fn test_adopted_publisher_composes_with_operators() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_publisher(Pushing::new(4)).map(|v| v * 10))
        .expect_next_all([0, 10, 20, 30])
        .verify_complete()?;

    Ok(())
}
