// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Resumable per-element error handling.
//!
//! An `on_error_continue` stage does not intercept error *signals*: by the time an
//! error signal exists the upstream sequence is already over. Instead it publishes a
//! [`ContinueStrategy`] upstream through [`Subscriber::continue_strategy`]. Stages
//! that process elements one at a time (mapping stages) look the strategy up when
//! they are subscribed and consult it when processing a single element fails:
//!
//! - [`Continuation::Resumed`]: the element is dropped, the stage requests a
//!   replacement from upstream and keeps going.
//! - [`Continuation::Unhandled`]: no handler in the chain matched; the stage
//!   terminates with the original error.
//! - [`Continuation::Failed`]: the matching handler itself failed; the stage
//!   terminates with that failure.
//!
//! Stages that cannot resume (sources, timers) never look the strategy up, so an
//! error they produce always terminates the sequence.
//!
//! [`Subscriber::continue_strategy`]: crate::Subscriber::continue_strategy

use crate::error::RefluxError;
use crate::fault::catch_fault;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Decides whether an error applies to a handler.
pub type ErrorPredicate = Arc<dyn Fn(&RefluxError) -> bool + Send + Sync>;

/// Observes an error together with the element that caused it.
pub type ContinueHandler = Arc<dyn Fn(&RefluxError, &dyn Any) + Send + Sync>;

/// Outcome of offering a failed element to a [`ContinueStrategy`].
#[derive(Debug)]
pub enum Continuation {
    /// A handler accepted the error; the element is dropped and processing continues.
    Resumed,
    /// No handler matched.
    Unhandled,
    /// The matching handler faulted.
    Failed(RefluxError),
}

/// Ordered chain of error-continue handlers, closest stage first.
#[derive(Clone)]
pub struct ContinueStrategy {
    inner: Arc<Inner>,
}

struct Inner {
    predicate: ErrorPredicate,
    handler: ContinueHandler,
    fallback: Option<ContinueStrategy>,
}

impl ContinueStrategy {
    /// Creates a strategy that applies `handler` to errors accepted by `predicate`
    /// and delegates everything else to `fallback`.
    pub fn new(
        predicate: ErrorPredicate,
        handler: ContinueHandler,
        fallback: Option<ContinueStrategy>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                predicate,
                handler,
                fallback,
            }),
        }
    }

    /// Offers a failed element to the chain; the first matching handler wins.
    pub fn try_continue(&self, error: &RefluxError, element: &dyn Any) -> Continuation {
        let mut current = Some(self);
        while let Some(strategy) = current {
            let inner = &strategy.inner;
            match catch_fault(|| (inner.predicate)(error)) {
                Ok(true) => {
                    return match catch_fault(|| (inner.handler)(error, element)) {
                        Ok(()) => Continuation::Resumed,
                        Err(fault) => Continuation::Failed(fault),
                    };
                }
                Ok(false) => current = inner.fallback.as_ref(),
                Err(fault) => return Continuation::Failed(fault),
            }
        }
        Continuation::Unhandled
    }

    /// Number of handlers in the chain.
    pub fn len(&self) -> usize {
        let mut count = 1;
        let mut next = self.inner.fallback.as_ref();
        while let Some(strategy) = next {
            count += 1;
            next = strategy.inner.fallback.as_ref();
        }
        count
    }

    /// A strategy always holds at least one handler.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for ContinueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinueStrategy")
            .field("handlers", &self.len())
            .finish()
    }
}
