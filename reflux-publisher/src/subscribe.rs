// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::fault::catch_fault;
use reflux_core::{
    hooks, DeliveryGate, Disposable, Publisher, RefluxError, SharedSubscription, Subscriber,
    UNBOUNDED,
};
use std::sync::Arc;

pub(crate) type NextCallback<T> = Box<dyn FnMut(T) + Send>;
pub(crate) type ErrorCallback = Box<dyn FnMut(RefluxError) + Send>;
pub(crate) type CompleteCallback = Box<dyn FnMut() + Send>;

/// Attaches a callback-driven consumer requesting unbounded demand.
pub(crate) fn subscribe_lambda<T, P>(
    publisher: &P,
    on_next: NextCallback<T>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
) -> Disposable
where
    T: Send + 'static,
    P: Publisher<T> + ?Sized,
{
    let gate = Arc::new(DeliveryGate::new());
    publisher.attach(Box::new(LambdaSubscriber {
        gate: gate.clone(),
        upstream: None,
        on_next,
        on_error,
        on_complete,
    }));
    Disposable::new(gate)
}

struct LambdaSubscriber<T> {
    gate: Arc<DeliveryGate>,
    upstream: Option<SharedSubscription>,
    on_next: NextCallback<T>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
}

impl<T> LambdaSubscriber<T> {
    fn deliver_error(&mut self, error: RefluxError) {
        let on_error = &mut self.on_error;
        let mut pending = Some(error);
        self.gate.deliver_terminal(|| {
            let Some(error) = pending.take() else {
                return;
            };
            match on_error.as_mut() {
                Some(callback) => {
                    if let Err(fault) = catch_fault(|| callback(error)) {
                        hooks::on_error_dropped(&fault);
                    }
                }
                None => hooks::on_error_dropped(&error),
            }
        });

        // Cancelled or already terminated.
        if let Some(error) = pending {
            hooks::on_error_dropped(&error);
        }
        self.upstream = None;
    }
}

impl<T: Send + 'static> Subscriber<T> for LambdaSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        if self.gate.set_upstream(subscription.clone()) {
            self.upstream = Some(subscription.clone());
            subscription.request(UNBOUNDED);
        }
    }

    fn on_next(&mut self, value: T) {
        let on_next = &mut self.on_next;
        let delivered = self.gate.deliver(|| catch_fault(|| on_next(value)));

        match delivered {
            None => hooks::on_next_dropped("subscribe"),
            Some(Ok(())) => {}
            Some(Err(fault)) => {
                if let Some(upstream) = self.upstream.take() {
                    upstream.cancel();
                }
                self.deliver_error(fault);
            }
        }
    }

    fn on_error(&mut self, error: RefluxError) {
        self.deliver_error(error);
    }

    fn on_complete(&mut self) {
        let on_complete = &mut self.on_complete;
        self.gate.deliver_terminal(|| {
            if let Some(callback) = on_complete.as_mut() {
                if let Err(fault) = catch_fault(callback) {
                    hooks::on_error_dropped(&fault);
                }
            }
        });
        self.upstream = None;
    }
}
