// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_publisher::Flux;
use reflux_publisher_time::DelayElementsExt;
use reflux_test_utils::{assert_no_signal_within, wait_until, TestProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_cancel_while_a_delay_is_pending() {
    // Arrange
    let cancels = Arc::new(AtomicUsize::new(0));
    let counted = cancels.clone();
    let flux = Flux::range(1, 10)
        .do_on_cancel(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        })
        .delay_elements(Duration::from_millis(50));
    let probe = TestProbe::attach_with_request(&flux, 1);

    // Act
    probe.cancel();

    // Assert
    assert_no_signal_within(&probe, 150);
    assert_eq!(probe.signal_count(), 0);
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
}

#[test]
fn test_no_value_after_cancel() {
    // Arrange
    let seen = Arc::new(AtomicUsize::new(0));
    let counted = seen.clone();
    let disposable = Flux::range(1, 1_000)
        .delay_elements(Duration::from_millis(2))
        .subscribe(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
    assert!(wait_until(Duration::from_secs(1), || seen.load(Ordering::SeqCst) >= 3));

    // Act
    disposable.cancel();
    let delivered = seen.load(Ordering::SeqCst);

    // Assert
    assert!(!wait_until(Duration::from_millis(50), || seen.load(Ordering::SeqCst) > delivered));
    assert!(disposable.is_cancelled());
    assert!(!disposable.is_terminated());
}

#[test]
fn test_cancel_is_idempotent() {
    // Arrange
    let cancels = Arc::new(AtomicUsize::new(0));
    let counted = cancels.clone();
    let flux = Flux::range(1, 10)
        .do_on_cancel(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        })
        .delay_elements(Duration::from_millis(20));
    let probe = TestProbe::attach_with_request(&flux, 1);

    // Act
    probe.cancel();
    probe.cancel();

    // Assert
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
}
