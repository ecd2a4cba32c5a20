// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::fault::{catch_fault, panic_message};
use reflux_core::RefluxError;

#[test]
fn test_catch_fault_passes_result_through() -> anyhow::Result<()> {
    let value = catch_fault(|| "ok")?;
    assert_eq!(value, "ok");
    Ok(())
}

#[test]
fn test_catch_fault_converts_panic() {
    let result = catch_fault(|| -> u8 { panic!("bad mapper at {}", 8) });

    match result {
        Err(RefluxError::CallbackPanic { context }) => assert_eq!(context, "bad mapper at 8"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_panic_message_of_unknown_payload() {
    let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
    assert_eq!(panic_message(&*payload), "non-string panic payload");
}
