// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::RefluxError;
use reflux_publisher::Flux;
use reflux_test_utils::test_data::{one_to, people, words, Person};
use reflux_test_utils::{StepVerifier, TestProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_map_identity_preserves_the_sequence() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_sequence(words()).map(|w| w))
        .expect_next_sequence(words())
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_map_changes_the_element_type() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_sequence(people()).map(|p: Person| p.age))
        .expect_next_all([25, 30, 35])
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_map_chains_in_order() -> anyhow::Result<()> {
    StepVerifier::create(Flux::range(1, 3).map(|i| 42 + i).map(|i| i.to_string()))
        .expect_next_all(["43", "44", "45"].map(String::from))
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_map_is_lazy() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();

    // Act
    let flux = Flux::range(1, 5).map(move |i| {
        counted.fetch_add(1, Ordering::SeqCst);
        i
    });
    let before = calls.load(Ordering::SeqCst);
    let probe = TestProbe::attach(&flux);
    probe.request(2);

    // Assert
    assert_eq!(before, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_map_panic_terminates_and_cancels_upstream() {
    // Arrange
    let cancels = Arc::new(AtomicUsize::new(0));
    let counted = cancels.clone();
    let flux = Flux::range(1, 20)
        .do_on_cancel(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        })
        .map(|v| {
            if v == 8 {
                panic!("eight is just isn't right");
            }
            v
        });

    // Act
    let probe = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert_eq!(probe.values(), one_to(7));
    assert!(matches!(
        probe.error(),
        Some(RefluxError::CallbackPanic { context }) if context.contains("eight")
    ));
    assert_eq!(probe.error_count(), 1);
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
    assert!(probe.violations().is_empty());
}

#[test]
fn test_map_forwards_upstream_errors() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<i32>::error(RefluxError::stream_error("upstream")).map(|v| v * 2))
        .expect_error_message("upstream")
        .verify()?;

    Ok(())
}

#[test]
fn test_map_over_shared_elements_that_cannot_be_cloned() -> anyhow::Result<()> {
    // Arrange
    struct Ticket(u32);
    let tickets = vec![Arc::new(Ticket(7)), Arc::new(Ticket(9))];

    // Act & Assert
    StepVerifier::create(Flux::from_sequence(tickets).map(|ticket| ticket.0 * 2))
        .expect_next_all([14, 18])
        .verify_complete()?;

    Ok(())
}
