// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide reporters for signals that have nowhere left to go.
//!
//! An error reaching a subscriber that has no error callback, or any signal that
//! arrives after a subscription already terminated, ends up here instead of being
//! silently lost. Both cases are always logged; a handler can be installed to
//! observe them programmatically.

use crate::error::RefluxError;
use parking_lot::{const_rwlock, RwLock};
use std::sync::Arc;

type DroppedErrorHandler = Arc<dyn Fn(&RefluxError) + Send + Sync>;

static ON_ERROR_DROPPED: RwLock<Option<DroppedErrorHandler>> = const_rwlock(None);

/// Installs the process-wide handler for dropped errors, replacing any previous one.
pub fn set_on_error_dropped<F>(handler: F)
where
    F: Fn(&RefluxError) + Send + Sync + 'static,
{
    *ON_ERROR_DROPPED.write() = Some(Arc::new(handler));
}

/// Removes the installed dropped-error handler.
pub fn reset_on_error_dropped() {
    *ON_ERROR_DROPPED.write() = None;
}

/// Reports an error that could not be delivered to any error callback.
pub fn on_error_dropped(error: &RefluxError) {
    error!("Unhandled error dropped: {}", error);

    let handler = ON_ERROR_DROPPED.read().clone();
    if let Some(handler) = handler {
        if crate::fault::catch_fault(|| handler(error)).is_err() {
            error!("onErrorDropped handler panicked");
        }
    }
}

/// Reports a value that arrived after its subscription terminated or was cancelled.
pub fn on_next_dropped(stage: &str) {
    debug!("{}: value dropped after termination", stage);
}
