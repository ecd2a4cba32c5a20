// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::{RefluxError, SharedSubscription, Signal, Subscriber};

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Subscriber<i32> for Recorder {
    fn on_subscribe(&mut self, _subscription: SharedSubscription) {
        self.events.push("subscribe".to_string());
    }

    fn on_next(&mut self, value: i32) {
        self.events.push(format!("next({value})"));
    }

    fn on_error(&mut self, error: RefluxError) {
        self.events.push(format!("error({error})"));
    }

    fn on_complete(&mut self) {
        self.events.push("complete".to_string());
    }
}

#[test]
fn test_signal_classification() {
    let value: Signal<i32> = Signal::Value(1);
    let error: Signal<i32> = Signal::Error(RefluxError::stream_error("x"));
    let complete: Signal<i32> = Signal::Complete;

    assert!(value.is_value() && !value.is_terminal());
    assert!(error.is_error() && error.is_terminal());
    assert!(complete.is_complete() && complete.is_terminal());
}

#[test]
fn test_errors_never_compare_equal() {
    let a: Signal<i32> = Signal::Error(RefluxError::stream_error("same"));
    let b: Signal<i32> = Signal::Error(RefluxError::stream_error("same"));

    assert_ne!(a, b);
    assert_eq!(Signal::<i32>::Complete, Signal::Complete);
    assert_eq!(Signal::Value(3), Signal::Value(3));
}

#[test]
fn test_map_keeps_terminal_signals() {
    assert_eq!(Signal::Value(2).map(|v| v * 10), Signal::Value(20));
    assert_eq!(Signal::<i32>::Complete.map(|v| v * 10), Signal::Complete);
    assert!(Signal::<i32>::Error(RefluxError::stream_error("e"))
        .map(|v| v * 10)
        .is_error());
}

#[test]
fn test_from_result() {
    let ok: Signal<i32> = Ok(5).into();
    let err: Signal<i32> = Err(RefluxError::stream_error("bad")).into();

    assert_eq!(ok.ok(), Some(5));
    assert!(err.err().is_some());
}

#[test]
fn test_deliver_dispatches_to_callbacks() -> anyhow::Result<()> {
    // Arrange
    let mut recorder = Recorder::default();

    // Act
    Signal::Value(1).deliver(&mut recorder);
    Signal::Error(RefluxError::stream_error("x")).deliver(&mut recorder);
    Signal::<i32>::Complete.deliver(&mut recorder);

    // Assert
    assert_eq!(
        recorder.events,
        vec![
            "next(1)".to_string(),
            "error(Stream processing error: x)".to_string(),
            "complete".to_string(),
        ]
    );
    Ok(())
}
