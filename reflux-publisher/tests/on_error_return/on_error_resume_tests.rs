// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::RefluxError;
use reflux_publisher::Flux;
use reflux_test_utils::{error_injecting, IllegalState, StepVerifier, TestProbe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_resume_switches_to_the_fallback_publisher() -> anyhow::Result<()> {
    StepVerifier::create(error_injecting(vec![1, 2], 2).on_error_resume(|_| Flux::from_sequence(vec![10, 11])))
        .expect_next_all([1, 2, 10, 11])
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_resume_passes_the_error_to_the_selector() -> anyhow::Result<()> {
    // Arrange
    let flux = error_injecting(vec![0], 0).on_error_resume(|e: &RefluxError| {
        if e.is::<IllegalState>() {
            Flux::just(1)
        } else {
            Flux::just(2)
        }
    });

    // Act & Assert
    StepVerifier::create(flux).expect_next(1).verify_complete()?;

    Ok(())
}

#[test]
fn test_fallback_error_reaches_downstream() -> anyhow::Result<()> {
    // Arrange
    let switches = Arc::new(AtomicUsize::new(0));
    let counted = switches.clone();
    let flux = Flux::<i32>::error(RefluxError::stream_error("first")).on_error_resume(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        Flux::error(RefluxError::stream_error("second"))
    });

    // Act
    StepVerifier::create(flux).expect_error_message("second").verify()?;

    // Assert
    assert_eq!(switches.load(Ordering::SeqCst), 1);

    Ok(())
}

#[test]
fn test_panicking_selector_becomes_the_error() -> anyhow::Result<()> {
    StepVerifier::create(
        Flux::<i32>::error(RefluxError::stream_error("first"))
            .on_error_resume(|_| panic!("selector broke")),
    )
    .expect_error_message("selector broke")
    .verify()?;

    Ok(())
}

#[test]
fn test_cancel_reaches_the_fallback() {
    // Arrange
    let probe = TestProbe::attach(&error_injecting(vec![1], 1).on_error_resume(|_| Flux::range(100, 1_000)));
    probe.request(3);

    // Act
    probe.cancel();
    probe.request(10);

    // Assert
    assert_eq!(probe.values(), vec![1, 100, 101]);
    assert!(!probe.is_terminated());
}
