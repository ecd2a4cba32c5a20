// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::PullSource;
use reflux_core::{RefluxError, Signal};

/// Emits `count` consecutive integers starting at `start`.
pub(crate) struct RangeSource {
    next: i64,
    remaining: u64,
    overflow: Option<RefluxError>,
}

impl RangeSource {
    pub(crate) fn new(start: i64, count: u64) -> Self {
        let last = i128::from(start) + i128::from(count) - 1;
        let overflow = (count > 0 && last > i128::from(i64::MAX)).then(|| {
            RefluxError::stream_error(format!(
                "range({start}, {count}) overflows i64: last value would be {last}"
            ))
        });

        Self {
            next: start,
            remaining: count,
            overflow,
        }
    }
}

impl PullSource<i64> for RangeSource {
    fn pull(&mut self) -> Signal<i64> {
        let value = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next += 1;
        }
        Signal::Value(value)
    }

    fn terminal(&mut self) -> Option<Signal<i64>> {
        if let Some(error) = self.overflow.take() {
            self.remaining = 0;
            return Some(Signal::Error(error));
        }
        (self.remaining == 0).then_some(Signal::Complete)
    }
}
