// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use reflux_core::RefluxError;
use reflux_publisher::Flux;
use reflux_scheduler::{Scheduler, SchedulerConfig};
use reflux_test_utils::test_data::one_to;
use reflux_test_utils::{error_injecting, StepVerifier, TestProbe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn thread_name() -> String {
    thread::current().name().unwrap_or("<unnamed>").to_string()
}

#[test]
fn test_downstream_runs_on_a_named_worker() {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("pub-parallel", 4);
    let flux = Flux::range(1, 20)
        .map(|i| 42 + i)
        .publish_on(scheduler)
        .map(|m| format!("{} value produced::{}", thread_name(), m));

    // Act
    let probe = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert!(probe.await_terminal(WAIT));
    assert!(probe.is_completed());
    let values = probe.values();
    assert_eq!(values.len(), 20);
    let lane = values[0].split(' ').next().unwrap_or_default().to_string();
    assert!(lane.starts_with("pub-parallel-"));
    for (value, expected) in values.iter().zip(43..=62) {
        assert_eq!(*value, format!("{lane} value produced::{expected}"));
    }
}

#[test]
fn test_subscriptions_are_assigned_workers_round_robin() {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("round-robin", 2);
    let flux = Flux::range(1, 3).publish_on(scheduler).map(|_| thread_name());

    // Act
    let first = TestProbe::attach_with_request(&flux, u64::MAX);
    let second = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert!(first.await_terminal(WAIT) && second.await_terminal(WAIT));
    assert_eq!(first.values(), vec!["round-robin-1".to_string(); 3]);
    assert_eq!(second.values(), vec!["round-robin-2".to_string(); 3]);
}

#[test]
fn test_values_keep_their_order() -> anyhow::Result<()> {
    StepVerifier::create(Flux::range(1, 10_000).publish_on(Scheduler::new_worker_pool("order", 2)))
        .expect_next_sequence(one_to(10_000))
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_downstream_demand_is_honoured() {
    // Arrange
    let flux = Flux::range(1, 100).publish_on(Scheduler::new_worker_pool("demand", 1));
    let probe = TestProbe::attach(&flux);

    // Act
    probe.request(3);

    // Assert
    assert!(probe.await_count(3, WAIT));
    reflux_test_utils::assert_no_signal_within(&probe, 50);
    assert_eq!(probe.values(), vec![1, 2, 3]);
    probe.cancel();
}

#[test]
fn test_upstream_is_replenished_in_batches() {
    // Arrange
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let flux = Flux::range(1, 20)
        .do_on_request(move |n| recorded.lock().push(n))
        .publish_on_with_prefetch(Scheduler::new_worker_pool("prefetch", 1), 4);

    // Act
    let probe = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert!(probe.await_terminal(WAIT));
    assert_eq!(probe.values(), one_to(20));
    let requests = requests.lock();
    assert_eq!(requests.first(), Some(&4));
    assert!(requests[1..].iter().all(|n| *n == 3));
}

#[test]
fn test_upstream_demand_never_exceeds_downstream_demand() {
    // Arrange
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let flux = Flux::range(1, 1_000)
        .do_on_request(move |n| recorded.lock().push(n))
        .publish_on(Scheduler::new_worker_pool("bounded", 1));
    let consumer = TestProbe::attach(&flux);

    // Act
    consumer.request(1);

    // Assert
    assert!(consumer.await_count(1, WAIT));
    reflux_test_utils::assert_no_signal_within(&consumer, 50);
    assert_eq!(consumer.values(), vec![1]);
    assert_eq!(*requests.lock(), vec![1]);
    consumer.cancel();
}

#[test]
fn test_bounded_demand_is_split_by_the_prefetch_window() {
    // Arrange
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let flux = Flux::range(1, 1_000)
        .do_on_request(move |n| recorded.lock().push(n))
        .publish_on_with_prefetch(Scheduler::new_worker_pool("windowed", 1), 4);
    let consumer = TestProbe::attach(&flux);

    // Act
    consumer.request(10);

    // Assert
    assert!(consumer.await_count(10, WAIT));
    reflux_test_utils::assert_no_signal_within(&consumer, 50);
    assert_eq!(consumer.values(), one_to(10));
    let requests = requests.lock();
    assert_eq!(requests.iter().sum::<u64>(), 10);
    assert!(requests.iter().all(|n| *n <= 4));
    drop(requests);
    consumer.cancel();
}

#[test]
fn test_error_is_delivered_after_queued_values() -> anyhow::Result<()> {
    StepVerifier::create(error_injecting(vec![1, 2, 3], 3).publish_on(Scheduler::new_worker_pool("error", 1)))
        .expect_next_all([1, 2, 3])
        .verify_error()?;

    Ok(())
}

#[test]
fn test_request_zero_surfaces_as_a_protocol_violation() {
    // Arrange
    let flux = Flux::range(1, 5).publish_on(Scheduler::new_worker_pool("zero", 1));
    let probe = TestProbe::attach(&flux);

    // Act
    probe.request(0);

    // Assert
    assert!(probe.await_terminal(WAIT));
    assert!(matches!(probe.error(), Some(RefluxError::ProtocolViolation { .. })));
}

#[test]
fn test_disposed_scheduler_rejects_the_subscription() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("gone", 2);
    scheduler.dispose();

    // Act & Assert
    StepVerifier::create(Flux::range(1, 3).publish_on(scheduler))
        .expect_error_matches(|e| matches!(e, RefluxError::SchedulerRejected { .. }))
        .verify()?;

    Ok(())
}

#[test]
fn test_parallel_scheduler_is_the_shared_default() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just("x").publish_on(Scheduler::parallel()).map(|_| thread_name()))
        .expect_next_matches(|name| name.starts_with("parallel-"))
        .verify_complete()?;

    Ok(())
}

#[test]
fn test_rejection_only_fails_the_affected_subscription() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::with_config(
        SchedulerConfig::new("narrow")
            .with_size(1)
            .with_queue_capacity(1),
    );
    let worker = scheduler.create_worker();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (filler_tx, filler_rx) = mpsc::channel();
    worker.schedule(move || {
        let _ = started_tx.send(());
        let _ = release_rx.recv_timeout(WAIT);
    })?;
    started_rx.recv_timeout(WAIT)?;
    worker.schedule(move || {
        let _ = filler_tx.send(());
    })?;
    let flux = Flux::range(1, 3).publish_on(scheduler.clone());

    // Act
    let rejected = TestProbe::attach_with_request(&flux, u64::MAX);
    release_tx.send(())?;
    filler_rx.recv_timeout(WAIT)?;
    let accepted = TestProbe::attach_with_request(&flux, u64::MAX);

    // Assert
    assert!(rejected.await_terminal(WAIT));
    assert!(rejected.values().is_empty());
    assert!(matches!(rejected.error(), Some(RefluxError::SchedulerRejected { .. })));
    assert!(accepted.await_terminal(WAIT));
    assert!(accepted.is_completed());
    assert_eq!(accepted.values(), vec![1, 2, 3]);
    assert!(!scheduler.is_disposed());
    scheduler.dispose();
    Ok(())
}
