// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::test_probe::TestProbe;
use std::thread;
use std::time::{Duration, Instant};

/// Asserts that `probe` receives nothing beyond what it already has within `timeout_ms`.
pub fn assert_no_signal_within<T>(probe: &TestProbe<T>, timeout_ms: u64) {
    let before = probe.signal_count();
    if probe.await_count(before + 1, Duration::from_millis(timeout_ms)) {
        panic!("Unexpected signal emitted, expected no output.");
    }
}

/// Polls `condition` every millisecond until it holds or `timeout` elapses.
///
/// Returns the last outcome of `condition`.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
