// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for error injection in publishers.

use crate::test_error::IllegalState;
use reflux_publisher::Flux;
use std::sync::Arc;

/// A `Flux` emitting the first `inject_error_at` items of `items`, then failing
/// with an [`IllegalState`] error.
///
/// If `inject_error_at` is past the end, all items are emitted and the sequence
/// completes normally. Every subscription starts over from the first item.
///
/// # Examples
///
/// ```rust
/// use reflux_test_utils::{error_injecting, IllegalState, StepVerifier};
///
/// StepVerifier::create(error_injecting(vec![1, 2, 3], 2))
///     .expect_next(1)
///     .expect_next(2)
///     .expect_error_kind::<IllegalState>()
///     .verify()
///     .unwrap();
/// ```
pub fn error_injecting<T>(items: Vec<T>, inject_error_at: usize) -> Flux<T>
where
    T: Clone + Send + Sync + 'static,
{
    let items = Arc::new(items);
    Flux::generate(
        || 0usize,
        move |index, sink| {
            if index == inject_error_at {
                sink.error(IllegalState::error(format!("injected at {index}")));
            } else if let Some(item) = items.get(index) {
                sink.next(item.clone());
            } else {
                sink.complete();
            }
            index + 1
        },
    )
}
