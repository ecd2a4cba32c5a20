// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the reflux reactive-streams engine
//!
//! Every failure inside a pipeline travels as a [`Signal::Error`](crate::Signal::Error)
//! carrying a [`RefluxError`]. Nothing is ever thrown out of a `subscribe` call.
//!
//! # Examples
//!
//! ```
//! use reflux_core::{RefluxError, Result};
//!
//! fn process_data() -> Result<()> {
//!     Err(RefluxError::stream_error("Stream not ready"))
//! }
//! ```

use std::error::Error;
use std::sync::Arc;

/// Shared, type-erased user error.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Root error type for all reflux operations
///
/// The variants follow the engine's error taxonomy: producer faults
/// (`CallbackPanic`, `UserError`), protocol violations (`ProtocolViolation`),
/// scheduler failures (`SchedulerRejected`) and domain errors
/// (`UserError`, `StreamProcessingError`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefluxError {
    /// Stream processing encountered an error
    ///
    /// This is a general, message-only error for failures that don't fit
    /// other specific categories.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// The original error is kept behind an `Arc`, so cloning a signal keeps
    /// the error's concrete type available to [`RefluxError::is`].
    #[error("User error: {0}")]
    UserError(#[source] SharedError),

    /// User-provided callback panicked
    ///
    /// A panic inside a source, mapper, hook or generator is caught at the
    /// stage boundary and converted to this variant.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// The panic payload, rendered as text when possible
        context: String,
    },

    /// A stage broke the publisher/subscriber contract
    ///
    /// Examples: a generator calling `next` twice in one invocation, a value
    /// delivered without outstanding demand, or `request(0)`.
    #[error("Protocol violation: {context}")]
    ProtocolViolation {
        /// Which rule was broken
        context: String,
    },

    /// A scheduler refused to run a task
    #[error("Scheduler '{scheduler}' rejected task: {reason}")]
    SchedulerRejected {
        /// Name of the scheduler that rejected the task
        scheduler: String,
        /// Why the task was rejected (disposed, queue full, ...)
        reason: String,
    },

    /// Multiple errors occurred
    ///
    /// No operator produces this variant. It exists for user code that aggregates
    /// several failures (see [`RefluxError::from_user_errors`]) before signalling
    /// them through `try_map`, `Flux::error` or a generator sink.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<RefluxError>,
    },
}

impl RefluxError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Create a protocol violation error with the given context
    pub fn protocol_violation(context: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            context: context.into(),
        }
    }

    /// Create a scheduler rejection error
    pub fn scheduler_rejected(scheduler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchedulerRejected {
            scheduler: scheduler.into(),
            reason: reason.into(),
        }
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    ///
    /// A helper for user code; the engine itself never aggregates errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use reflux_core::RefluxError;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// #[error("Custom error: {msg}")]
    /// struct CustomError {
    ///     msg: String,
    /// }
    ///
    /// let errors = vec![
    ///     CustomError { msg: "first".to_string() },
    ///     CustomError { msg: "second".to_string() },
    /// ];
    ///
    /// let result = RefluxError::from_user_errors(errors);
    /// assert!(matches!(result, RefluxError::MultipleErrors { count: 2, .. }));
    /// ```
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let errors = errors.into_iter().map(Self::user_error).collect();

        Self::MultipleErrors { count, errors }
    }

    /// Returns `true` if this error wraps a user error of type `E`.
    ///
    /// This is the "error kind" used by the kind-filtered recovery operators.
    ///
    /// ```
    /// use reflux_core::RefluxError;
    /// use std::io;
    ///
    /// let err = RefluxError::user_error(io::Error::other("disk"));
    /// assert!(err.is::<io::Error>());
    /// assert!(!err.is::<std::fmt::Error>());
    /// ```
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }

    /// Borrow the wrapped user error as `E`, if it is one.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        match self {
            Self::UserError(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Only domain errors are candidates for recovery; faults inside the
    /// engine itself are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UserError(_) | Self::StreamProcessingError { .. } | Self::CallbackPanic { .. }
        )
    }

    /// Check if this error indicates a permanent failure
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. } | Self::SchedulerRejected { .. }
        )
    }
}

/// Specialized Result type for reflux operations
pub type Result<T> = std::result::Result<T, RefluxError>;

/// Extension trait for converting errors into `RefluxError`
///
/// Implemented for all `std::error::Error + Send + Sync + 'static` types.
pub trait IntoRefluxError {
    /// Convert this error into a `RefluxError` with additional context
    fn into_reflux_error(self, context: &str) -> RefluxError;

    /// Convert this error into a `RefluxError` without additional context
    fn into_reflux(self) -> RefluxError
    where
        Self: Sized,
    {
        self.into_reflux_error("")
    }
}

impl<E: Error + Send + Sync + 'static> IntoRefluxError for E {
    fn into_reflux_error(self, context: &str) -> RefluxError {
        if context.is_empty() {
            RefluxError::user_error(self)
        } else {
            RefluxError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(RefluxError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(RefluxError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<RefluxError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.with_context(|| context.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            RefluxError::UserError(inner) => RefluxError::StreamProcessingError {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}
