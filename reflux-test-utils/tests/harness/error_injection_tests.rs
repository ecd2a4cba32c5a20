// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_test_utils::{error_injecting, IllegalState, StepVerifier};

#[test]
fn fails_after_the_prefix() -> anyhow::Result<()> {
    StepVerifier::create(error_injecting(vec!["a", "b", "c"], 1))
        .expect_next("a")
        .expect_error_kind::<IllegalState>()
        .verify()?;

    Ok(())
}

#[test]
fn fails_immediately_at_zero() -> anyhow::Result<()> {
    StepVerifier::create(error_injecting(vec![1, 2], 0))
        .expect_error_message("injected at 0")
        .verify()?;

    Ok(())
}

#[test]
fn completes_when_the_position_is_past_the_end() -> anyhow::Result<()> {
    StepVerifier::create(error_injecting(vec![1, 2], 5))
        .expect_next_all([1, 2])
        .verify_complete()?;

    Ok(())
}

#[test]
fn restarts_for_every_subscription() -> anyhow::Result<()> {
    // Arrange
    let flux = error_injecting(vec![7, 8, 9], 2);

    // Act & Assert
    for _ in 0..2 {
        StepVerifier::create(flux.clone())
            .expect_next_all([7, 8])
            .verify_error()?;
    }

    Ok(())
}
