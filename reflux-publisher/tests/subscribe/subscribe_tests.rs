// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use reflux_core::{hooks, RefluxError};
use reflux_publisher::{Flux, Mono};
use reflux_scheduler::Scheduler;
use reflux_test_utils::test_data::one_to;
use reflux_test_utils::{wait_until, IllegalArgument};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_subscribe_with_complete_sees_every_signal() {
    // Arrange
    let values = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(AtomicUsize::new(0));
    let completions = Arc::new(AtomicUsize::new(0));
    let (v, e, c) = (values.clone(), errors.clone(), completions.clone());

    // Act
    let disposable = Flux::range(1, 5).subscribe_with_complete(
        move |value| v.lock().push(value),
        move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        },
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        },
    );

    // Assert
    assert_eq!(*values.lock(), one_to(5));
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert!(disposable.is_terminated());
    assert!(disposable.is_disposed());
    assert!(!disposable.is_cancelled());
}

#[test]
fn test_error_callback_receives_the_error() {
    // Arrange
    let received = Arc::new(Mutex::new(None));
    let sink = received.clone();

    // Act
    Mono::<i32>::error(IllegalArgument::error("what just happened")).subscribe_with_error(
        |_| {},
        move |e| *sink.lock() = Some(e),
    );

    // Assert
    assert!(received
        .lock()
        .as_ref()
        .is_some_and(|e| e.is::<IllegalArgument>()));
}

#[test]
fn test_error_without_callback_goes_to_the_dropped_hook() {
    // Arrange
    let dropped = Arc::new(Mutex::new(Vec::new()));
    let sink = dropped.clone();
    hooks::set_on_error_dropped(move |e: &RefluxError| {
        if e.to_string().contains("unhandled marker") {
            sink.lock().push(e.to_string());
        }
    });

    // Act
    Mono::<i32>::error(RefluxError::stream_error("unhandled marker")).subscribe(|_| {});

    // Assert
    hooks::reset_on_error_dropped();
    assert_eq!(dropped.lock().len(), 1);
}

#[test]
fn test_panic_in_on_next_cancels_and_reports() {
    // Arrange
    let values = Arc::new(Mutex::new(Vec::new()));
    let error = Arc::new(Mutex::new(None));
    let cancels = Arc::new(AtomicUsize::new(0));
    let (v, e, c) = (values.clone(), error.clone(), cancels.clone());
    let flux = Flux::range(1, 10).do_on_cancel(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    flux.subscribe_with_error(
        move |value| {
            if value == 3 {
                panic!("consumer failed");
            }
            v.lock().push(value);
        },
        move |err| *e.lock() = Some(err),
    );

    // Assert
    assert_eq!(*values.lock(), vec![1, 2]);
    assert!(matches!(
        &*error.lock(),
        Some(RefluxError::CallbackPanic { context }) if context == "consumer failed"
    ));
    assert_eq!(cancels.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dispose_is_idempotent() {
    // Arrange
    let flux = Flux::range(1, 1_000_000).publish_on(Scheduler::new_worker_pool("dispose", 1));
    let seen = Arc::new(AtomicUsize::new(0));
    let counted = seen.clone();
    let disposable = flux.subscribe(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    disposable.cancel();
    disposable.cancel();
    let at_cancel = seen.load(Ordering::SeqCst);

    // Assert
    assert!(disposable.is_cancelled());
    assert!(disposable.is_disposed());
    assert!(!wait_until(Duration::from_millis(50), || seen.load(Ordering::SeqCst) != at_cancel));
}

#[test]
fn test_clones_of_a_disposable_share_the_subscription() {
    // Arrange
    let disposable = Flux::range(1, 10)
        .publish_on(Scheduler::new_worker_pool("clone", 1))
        .subscribe(|_| {});
    let other = disposable.clone();

    // Act
    other.cancel();

    // Assert
    assert!(disposable.is_cancelled());
}

#[test]
fn test_subscribing_twice_runs_twice() {
    // Arrange
    let total = Arc::new(AtomicUsize::new(0));
    let flux = Flux::range(1, 4);

    // Act
    for _ in 0..2 {
        let counted = total.clone();
        flux.subscribe(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });
    }

    // Assert
    assert_eq!(total.load(Ordering::SeqCst), 8);
}
