// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_publisher::Flux;
use reflux_test_utils::test_data::{people, person_alice, words};
use reflux_test_utils::{StepVerifier, TestProbe};

#[test]
fn test_from_sequence_emits_items_in_order() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_sequence(words()))
        .expect_next("asd".to_string())
        .expect_next_all(["sdf", "dfg", "fgh"].map(String::from))
        .expect_next_sequence(["ghj", "hjk", "jl"].map(String::from))
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_from_empty_sequence_completes() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_sequence(Vec::<String>::new())).verify_complete()?;

    Ok(())
}

#[test]
fn test_each_subscription_iterates_from_the_start() -> anyhow::Result<()> {
    // Arrange
    let flux = Flux::from_sequence(people());

    // Act
    let first = TestProbe::attach_with_request(&flux, 1);
    let second = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert_eq!(first.values(), vec![person_alice()]);
    assert_eq!(second.values(), people());
    assert!(second.is_completed());
    StepVerifier::create(flux).expect_next_count(3).verify_complete()?;

    Ok(())
}

#[test]
fn test_completion_needs_no_extra_demand() {
    // Arrange
    let probe = TestProbe::attach(&Flux::from_sequence(vec![1, 2]));

    // Act
    probe.request(2);

    // Assert
    assert_eq!(probe.values(), vec![1, 2]);
    assert!(probe.is_completed());
}

#[test]
fn test_lazy_iterators_are_pulled_on_demand() {
    // Arrange
    let flux = Flux::from_sequence((0..).step_by(10));
    let probe = TestProbe::attach(&flux);

    // Act
    probe.request(4);

    // Assert
    assert_eq!(probe.values(), vec![0, 10, 20, 30]);
    assert!(!probe.is_terminated());
    probe.cancel();
}

#[test]
fn test_just_all_emits_every_value_then_completes() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just_all(["asd", "sdf", "dfg"]))
        .expect_next_all(["asd", "sdf", "dfg"])
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_just_all_honours_demand() {
    // Arrange
    let consumer = TestProbe::attach(&Flux::just_all([1, 2, 3, 4]));

    // Act
    consumer.request(2);

    // Assert
    assert_eq!(consumer.values(), vec![1, 2]);
    assert!(!consumer.is_terminated());
}
