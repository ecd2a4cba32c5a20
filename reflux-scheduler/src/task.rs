// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::CancellationToken;

/// Handle to a delayed job submitted with [`Worker::schedule_after`](crate::Worker::schedule_after).
///
/// Cancelling before the delay elapses guarantees the job never runs and releases
/// the pending timer right away. Dropping the handle does not cancel the job.
#[derive(Clone, Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancel the job if it has not started yet. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
