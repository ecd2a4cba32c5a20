// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Conversion of panics in user callbacks into error signals.

use crate::error::RefluxError;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs `f`, converting a panic into [`RefluxError::CallbackPanic`].
///
/// Every stage that calls user code goes through this, so a faulty callback never
/// unwinds through the engine or the subscriber's call stack.
///
/// # Errors
///
/// Returns `CallbackPanic` with the panic message when `f` panics.
///
/// ```
/// use reflux_core::fault::catch_fault;
///
/// let ok = catch_fault(|| 21 * 2);
/// assert_eq!(ok.unwrap(), 42);
///
/// let failed = catch_fault(|| -> i32 { panic!("boom") });
/// assert!(failed.unwrap_err().to_string().contains("boom"));
/// ```
pub fn catch_fault<R>(f: impl FnOnce() -> R) -> Result<R, RefluxError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| RefluxError::callback_panic(panic_message(&*payload)))
}

/// Renders a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
