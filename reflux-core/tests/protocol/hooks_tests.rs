// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use reflux_core::hooks::{on_error_dropped, reset_on_error_dropped, set_on_error_dropped};
use reflux_core::RefluxError;
use std::sync::Arc;

#[test]
fn test_dropped_errors_reach_installed_handler() -> anyhow::Result<()> {
    // Arrange
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    set_on_error_dropped(move |err| sink.lock().push(err.to_string()));

    // Act
    on_error_dropped(&RefluxError::stream_error("nobody listened"));
    reset_on_error_dropped();
    on_error_dropped(&RefluxError::stream_error("after reset"));

    // Assert
    assert_eq!(
        *seen.lock(),
        vec!["Stream processing error: nobody listened".to_string()]
    );
    Ok(())
}
