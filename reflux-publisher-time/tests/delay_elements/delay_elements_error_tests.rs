// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::RefluxError;
use reflux_publisher::Flux;
use reflux_publisher_time::DelayElementsExt;
use reflux_scheduler::Scheduler;
use reflux_test_utils::test_data::words;
use reflux_test_utils::{error_injecting, IllegalState, StepVerifier, TestProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_error_is_not_delayed() -> anyhow::Result<()> {
    // Arrange
    let flux = Flux::<i32>::error(RefluxError::stream_error("boom")).delay_elements(Duration::from_secs(5));

    // Act
    let elapsed = StepVerifier::create(flux)
        .expect_error_message("boom")
        .verify()?;

    // Assert
    assert!(elapsed < Duration::from_secs(1));

    Ok(())
}

#[test]
fn test_values_before_the_error_are_delivered() -> anyhow::Result<()> {
    // Arrange
    let flux = error_injecting(words(), 2).delay_elements(Duration::from_millis(5));

    // Act & Assert
    StepVerifier::create(flux)
        .expect_next_all(["asd", "sdf"].map(String::from))
        .expect_error_kind::<IllegalState>()
        .verify()?;

    Ok(())
}

#[test]
fn test_failing_map_after_delay_cancels_upstream() -> anyhow::Result<()> {
    // Arrange
    let flux = Flux::range(1, 20)
        .delay_elements(Duration::from_millis(2))
        .map(|i| {
            if i == 8 {
                panic!("Bum");
            }
            i
        });

    // Act & Assert
    StepVerifier::create(flux)
        .expect_next_all([1, 2, 3, 4, 5, 6, 7])
        .expect_error_matches(|e| matches!(e, RefluxError::CallbackPanic { context } if context == "Bum"))
        .verify()?;

    Ok(())
}

#[test]
fn test_request_zero_is_a_protocol_violation() {
    // Arrange
    let flux = Flux::range(1, 10).delay_elements(Duration::from_millis(1));
    let probe = TestProbe::attach(&flux);

    // Act
    probe.request(0);

    // Assert
    assert!(probe.await_terminal(Duration::from_secs(1)));
    assert!(matches!(
        probe.error(),
        Some(RefluxError::ProtocolViolation { .. })
    ));
    assert_eq!(probe.value_count(), 0);
}

#[test]
fn test_disposed_scheduler_rejects_the_subscription() {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("delay-disposed", 1);
    scheduler.dispose();
    let flux = Flux::range(1, 3).delay_elements_on(Duration::from_millis(1), scheduler);

    // Act
    let probe = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert!(probe.await_terminal(Duration::from_secs(1)));
    assert!(matches!(
        probe.error(),
        Some(RefluxError::SchedulerRejected { .. })
    ));
    assert_eq!(probe.value_count(), 0);
}

#[test]
fn test_dispose_while_a_delay_is_pending_fails_the_subscription() {
    // Arrange
    let cancels = Arc::new(AtomicUsize::new(0));
    let counted = cancels.clone();
    let scheduler = Scheduler::new_worker_pool("delay-abandoned", 1);
    let flux = Flux::range(1, 3)
        .do_on_cancel(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        })
        .delay_elements_on(Duration::from_millis(200), scheduler.clone());
    let consumer = TestProbe::attach_with_request(&flux, u64::MAX);
    thread::sleep(Duration::from_millis(50));

    // Act
    scheduler.dispose();

    // Assert
    assert!(consumer.await_terminal(Duration::from_secs(2)));
    assert!(consumer.values().is_empty());
    assert!(matches!(
        consumer.error(),
        Some(RefluxError::SchedulerRejected { scheduler, .. }) if scheduler == "delay-abandoned"
    ));
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
}
