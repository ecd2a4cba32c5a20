// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Typed errors for exercising kind-based recovery.
//!
//! Each error is its own type so `on_error_return_kind::<IllegalArgument>` and
//! friends can tell them apart.

use reflux_core::RefluxError;

/// An argument a callback refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal argument: {0}")]
pub struct IllegalArgument(pub String);

impl IllegalArgument {
    /// Wraps a new `IllegalArgument` as a user error.
    pub fn error(message: impl Into<String>) -> RefluxError {
        RefluxError::user_error(Self(message.into()))
    }
}

/// A state a callback could not work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal state: {0}")]
pub struct IllegalState(pub String);

impl IllegalState {
    /// Wraps a new `IllegalState` as a user error.
    pub fn error(message: impl Into<String>) -> RefluxError {
        RefluxError::user_error(Self(message.into()))
    }
}
