// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::RefluxError;
use crate::subscriber::Subscriber;

/// One event of a reactive sequence.
///
/// A subscription observes zero or more `Value` signals followed by at most one
/// terminal signal (`Error` or `Complete`). Nothing follows a terminal signal.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// A successful value
    Value(T),
    /// An error that terminates the sequence
    Error(RefluxError),
    /// Successful termination
    Complete,
}

impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Value(a), Signal::Value(b)) => a == b,
            (Signal::Complete, Signal::Complete) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> Signal<T> {
    /// Returns `true` if this is a `Value`.
    pub const fn is_value(&self) -> bool {
        matches!(self, Signal::Value(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, Signal::Error(_))
    }

    /// Returns `true` if this is `Complete`.
    pub const fn is_complete(&self) -> bool {
        matches!(self, Signal::Complete)
    }

    /// Returns `true` for `Error` and `Complete`.
    pub const fn is_terminal(&self) -> bool {
        !self.is_value()
    }

    /// Converts from `Signal<T>` to `Option<T>`, discarding terminal signals.
    pub fn ok(self) -> Option<T> {
        match self {
            Signal::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts from `Signal<T>` to `Option<RefluxError>`.
    pub fn err(self) -> Option<RefluxError> {
        match self {
            Signal::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the carried value, if any.
    pub const fn value(&self) -> Option<&T> {
        match self {
            Signal::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Maps a `Signal<T>` to `Signal<U>` by applying a function to the contained value.
    ///
    /// Terminal signals are propagated unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Signal::Value(v) => Signal::Value(f(v)),
            Signal::Error(e) => Signal::Error(e),
            Signal::Complete => Signal::Complete,
        }
    }

    /// Hands this signal to the matching subscriber callback.
    pub fn deliver<S>(self, subscriber: &mut S)
    where
        S: Subscriber<T> + ?Sized,
    {
        match self {
            Signal::Value(v) => subscriber.on_next(v),
            Signal::Error(e) => subscriber.on_error(e),
            Signal::Complete => subscriber.on_complete(),
        }
    }
}

impl<T> From<Result<T, RefluxError>> for Signal<T> {
    fn from(result: Result<T, RefluxError>) -> Self {
        match result {
            Ok(v) => Signal::Value(v),
            Err(e) => Signal::Error(e),
        }
    }
}
