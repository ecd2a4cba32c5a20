// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::PullSource;
use reflux_core::fault::catch_fault;
use reflux_core::{hooks, RefluxError, Signal};
use std::sync::Arc;

pub(crate) type StepFn<S, T> = Arc<dyn Fn(S, &mut SyncSink<T>) -> S + Send + Sync>;
pub(crate) type CleanupFn<S> = Arc<dyn Fn(S) + Send + Sync>;

/// One-shot sink handed to a generator step.
///
/// Within a single invocation the step may emit at most one value and at most one
/// terminal signal, with the terminal signal last. Anything else is recorded as a
/// protocol violation and terminates the sequence with an error after the value
/// already accepted, if any.
///
/// ```
/// use reflux_publisher::{Flux, SyncSink};
///
/// let countdown = Flux::generate(
///     || 3,
///     |n: i32, sink: &mut SyncSink<i32>| {
///         if n == 0 {
///             sink.complete();
///         } else {
///             sink.next(n);
///         }
///         n - 1
///     },
/// );
/// # let _ = countdown;
/// ```
#[derive(Debug)]
pub struct SyncSink<T> {
    value: Option<T>,
    terminal: Option<Signal<T>>,
    violation: Option<RefluxError>,
    called: bool,
}

impl<T> SyncSink<T> {
    fn new() -> Self {
        Self {
            value: None,
            terminal: None,
            violation: None,
            called: false,
        }
    }

    /// Emits a value. At most once per invocation.
    pub fn next(&mut self, value: T) {
        self.called = true;
        if self.terminal.is_some() {
            self.violate("next called after a terminal signal");
        } else if self.value.is_some() {
            self.violate("next called more than once in one generator invocation");
        } else {
            self.value = Some(value);
        }
    }

    /// Terminates the sequence successfully.
    pub fn complete(&mut self) {
        self.called = true;
        if self.terminal.is_some() {
            self.violate("complete called after a terminal signal");
        } else {
            self.terminal = Some(Signal::Complete);
        }
    }

    /// Terminates the sequence with `error`.
    pub fn error(&mut self, error: RefluxError) {
        self.called = true;
        if self.terminal.is_some() {
            self.violate("error called after a terminal signal");
        } else {
            self.terminal = Some(Signal::Error(error));
        }
    }

    fn violate(&mut self, context: &str) {
        if self.violation.is_none() {
            self.violation = Some(RefluxError::protocol_violation(context));
        }
    }
}

/// Pull-based generator: one step invocation per requested item.
pub(crate) struct GenerateSource<S, T> {
    state: Option<S>,
    step: StepFn<S, T>,
    cleanup: Option<CleanupFn<S>>,
    pending_terminal: Option<Signal<T>>,
}

impl<S, T> GenerateSource<S, T> {
    pub(crate) fn new(state: S, step: StepFn<S, T>, cleanup: Option<CleanupFn<S>>) -> Self {
        Self {
            state: Some(state),
            step,
            cleanup,
            pending_terminal: None,
        }
    }
}

impl<S: Send, T: Send> PullSource<T> for GenerateSource<S, T> {
    fn pull(&mut self) -> Signal<T> {
        let Some(state) = self.state.take() else {
            return Signal::Error(RefluxError::protocol_violation(
                "generator invoked after its state was lost",
            ));
        };

        let mut sink = SyncSink::new();
        let step = &self.step;
        let fault = match catch_fault(|| step(state, &mut sink)) {
            Ok(next_state) => {
                self.state = Some(next_state);
                None
            }
            Err(fault) => Some(fault),
        };

        let SyncSink {
            value,
            terminal,
            violation,
            called,
        } = sink;

        let failure = fault.or(violation).or_else(|| {
            (!called).then(|| {
                RefluxError::protocol_violation("generator invocation emitted no signal")
            })
        });
        let terminal = failure.map(Signal::Error).or(terminal);

        match value {
            Some(value) => {
                self.pending_terminal = terminal;
                Signal::Value(value)
            }
            None => terminal.unwrap_or(Signal::Complete),
        }
    }

    fn terminal(&mut self) -> Option<Signal<T>> {
        self.pending_terminal.take()
    }

    fn release(&mut self) {
        let (Some(state), Some(cleanup)) = (self.state.take(), self.cleanup.as_ref()) else {
            return;
        };
        if let Err(fault) = catch_fault(|| cleanup(state)) {
            hooks::on_error_dropped(&fault);
        }
    }
}
