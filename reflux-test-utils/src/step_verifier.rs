// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scripted verification of publishers.
//!
//! A [`StepVerifier`] collects expectations first and runs them when one of the
//! `verify*` methods is called: it subscribes a [`TestProbe`] with the configured
//! initial demand, then walks the steps in order, waiting at most the configured
//! timeout for each expected signal.

use crate::test_probe::TestProbe;
use reflux_core::{Publisher, RefluxError, Signal, UNBOUNDED};
use std::error::Error;
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Default wait for each expected signal.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a verification failed.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// An expected signal did not arrive in time.
    #[error("step {step}: timed out after {timeout:?} waiting for {expected}")]
    Timeout {
        /// Index of the failing step
        step: usize,
        /// What the step was waiting for
        expected: String,
        /// The per-step timeout in effect
        timeout: Duration,
    },

    /// A signal arrived but did not satisfy the step.
    #[error("step {step}: expected {expected}, got {actual}")]
    Mismatch {
        /// Index of the failing step
        step: usize,
        /// What the step expected
        expected: String,
        /// What was received
        actual: String,
    },

    /// The publisher broke the signal protocol.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

type ValueCheck<T> = Box<dyn Fn(&T) -> bool + Send>;
type ErrorCheck = Box<dyn Fn(&RefluxError) -> bool + Send>;

enum Step<T> {
    Next { check: ValueCheck<T>, expected: String },
    Count(usize),
    Error { check: ErrorCheck, expected: String },
    Complete,
    Request(u64),
    Cancel,
}

/// Builder of expectations against one subscription of a publisher.
///
/// ```rust
/// use reflux_core::RefluxError;
/// use reflux_publisher::Flux;
/// use reflux_test_utils::StepVerifier;
///
/// let flux = Flux::range(1, 5).try_map(|i| {
///     if i == 3 {
///         Err(RefluxError::stream_error("three"))
///     } else {
///         Ok(i)
///     }
/// });
///
/// StepVerifier::create(flux)
///     .expect_next(1)
///     .expect_next(2)
///     .expect_error_matches(|e| e.to_string().contains("three"))
///     .verify()
///     .unwrap();
/// ```
pub struct StepVerifier<T> {
    publisher: Box<dyn Publisher<T>>,
    initial_request: u64,
    timeout: Duration,
    steps: Vec<Step<T>>,
}

impl<T: Send + Debug + 'static> StepVerifier<T> {
    /// Verifies `publisher` with unbounded initial demand.
    pub fn create<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self::create_with_request(publisher, UNBOUNDED)
    }

    /// Verifies `publisher`, requesting `initial_request` on subscribe (0 for none).
    pub fn create_with_request<P>(publisher: P, initial_request: u64) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            publisher: Box::new(publisher),
            initial_request,
            timeout: DEFAULT_TIMEOUT,
            steps: Vec::new(),
        }
    }

    /// Sets the wait for each expected signal.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expects the next value to equal `expected`.
    #[must_use]
    pub fn expect_next(mut self, expected: T) -> Self
    where
        T: PartialEq,
    {
        let description = format!("value {expected:?}");
        self.steps.push(Step::Next {
            check: Box::new(move |actual| *actual == expected),
            expected: description,
        });
        self
    }

    /// Expects the given values next, in order.
    #[must_use]
    pub fn expect_next_all<const N: usize>(self, expected: [T; N]) -> Self
    where
        T: PartialEq,
    {
        self.expect_next_sequence(expected)
    }

    /// Expects the items of `expected` next, in order.
    #[must_use]
    pub fn expect_next_sequence<I>(self, expected: I) -> Self
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        expected.into_iter().fold(self, Self::expect_next)
    }

    /// Expects `count` values next, whatever they are.
    #[must_use]
    pub fn expect_next_count(mut self, count: usize) -> Self {
        self.steps.push(Step::Count(count));
        self
    }

    /// Expects the next value to satisfy `predicate`.
    #[must_use]
    pub fn expect_next_matches<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        self.steps.push(Step::Next {
            check: Box::new(predicate),
            expected: "a value matching the predicate".to_string(),
        });
        self
    }

    /// Expects an error signal next.
    #[must_use]
    pub fn expect_error(self) -> Self {
        self.push_error(|_| true, "an error")
    }

    /// Expects an error signal satisfying `predicate` next.
    #[must_use]
    pub fn expect_error_matches<F>(self, predicate: F) -> Self
    where
        F: Fn(&RefluxError) -> bool + Send + 'static,
    {
        self.push_error(predicate, "an error matching the predicate")
    }

    /// Expects an error wrapping a user error of type `E` next.
    #[must_use]
    pub fn expect_error_kind<E>(self) -> Self
    where
        E: Error + 'static,
    {
        let expected = format!("an error of kind {}", std::any::type_name::<E>());
        self.push_error(RefluxError::is::<E>, &expected)
    }

    /// Expects an error whose message contains `fragment` next.
    #[must_use]
    pub fn expect_error_message(self, fragment: &str) -> Self {
        let expected = format!("an error containing {fragment:?}");
        let fragment = fragment.to_string();
        self.push_error(move |e| e.to_string().contains(&fragment), &expected)
    }

    fn push_error<F>(mut self, check: F, expected: &str) -> Self
    where
        F: Fn(&RefluxError) -> bool + Send + 'static,
    {
        self.steps.push(Step::Error {
            check: Box::new(check),
            expected: expected.to_string(),
        });
        self
    }

    /// Expects completion next.
    #[must_use]
    pub fn expect_complete(mut self) -> Self {
        self.steps.push(Step::Complete);
        self
    }

    /// Requests `n` more values at this point of the script.
    #[must_use]
    pub fn then_request(mut self, n: u64) -> Self {
        self.steps.push(Step::Request(n));
        self
    }

    /// Cancels the subscription at this point of the script; later steps are ignored.
    #[must_use]
    pub fn then_cancel(mut self) -> Self {
        self.steps.push(Step::Cancel);
        self
    }

    /// Appends a completion expectation and runs the script.
    ///
    /// # Errors
    ///
    /// See [`verify`](Self::verify).
    pub fn verify_complete(self) -> Result<Duration, VerificationError> {
        self.expect_complete().verify()
    }

    /// Appends an error expectation and runs the script.
    ///
    /// # Errors
    ///
    /// See [`verify`](Self::verify).
    pub fn verify_error(self) -> Result<Duration, VerificationError> {
        self.expect_error().verify()
    }

    /// Runs the script and returns how long it took.
    ///
    /// A script that ends without a terminal expectation cancels the subscription.
    ///
    /// # Errors
    ///
    /// Returns the first failing step as a [`VerificationError`], or
    /// `ProtocolViolation` if the probe observed a protocol breach.
    pub fn verify(self) -> Result<Duration, VerificationError> {
        let started = Instant::now();
        let probe = TestProbe::attach_with_request(&*self.publisher, self.initial_request);
        let result = Run {
            probe: &probe,
            timeout: self.timeout,
            cursor: 0,
        }
        .execute(&self.steps);

        if !probe.is_terminated() {
            probe.cancel();
        }
        result?;

        match probe.violations().into_iter().next() {
            Some(violation) => Err(VerificationError::ProtocolViolation(violation)),
            None => Ok(started.elapsed()),
        }
    }
}

struct Run<'a, T> {
    probe: &'a TestProbe<T>,
    timeout: Duration,
    cursor: usize,
}

impl<T: Debug> Run<'_, T> {
    fn execute(&mut self, steps: &[Step<T>]) -> Result<(), VerificationError> {
        for (index, step) in steps.iter().enumerate() {
            match step {
                Step::Next { check, expected } => {
                    self.expect(index, expected, |signal| match signal {
                        Signal::Value(value) => check(value),
                        _ => false,
                    })?;
                }
                Step::Count(count) => {
                    for _ in 0..*count {
                        self.expect(index, &format!("{count} values"), Signal::is_value)?;
                    }
                }
                Step::Error { check, expected } => {
                    self.expect(index, expected, |signal| match signal {
                        Signal::Error(error) => check(error),
                        _ => false,
                    })?;
                }
                Step::Complete => self.expect(index, "completion", Signal::is_complete)?,
                Step::Request(n) => self.probe.request(*n),
                Step::Cancel => {
                    self.probe.cancel();
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    fn expect(
        &mut self,
        step: usize,
        expected: &str,
        check: impl FnOnce(&Signal<T>) -> bool,
    ) -> Result<(), VerificationError> {
        if !self.probe.await_count(self.cursor + 1, self.timeout) {
            if self.probe.is_terminated() {
                return Err(VerificationError::Mismatch {
                    step,
                    expected: expected.to_string(),
                    actual: "no further signal after termination".to_string(),
                });
            }
            return Err(VerificationError::Timeout {
                step,
                expected: expected.to_string(),
                timeout: self.timeout,
            });
        }

        let outcome = self
            .probe
            .inspect(self.cursor, |signal| check(signal).then_some(()).ok_or_else(|| describe(signal)));
        self.cursor += 1;

        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(actual)) => Err(VerificationError::Mismatch {
                step,
                expected: expected.to_string(),
                actual,
            }),
            None => Err(VerificationError::Timeout {
                step,
                expected: expected.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

fn describe<T: Debug>(signal: &Signal<T>) -> String {
    match signal {
        Signal::Value(value) => format!("value {value:?}"),
        Signal::Error(error) => format!("error \"{error}\""),
        Signal::Complete => "completion".to_string(),
    }
}
