// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Extension trait providing the `delay_elements` operator for `Flux`.
//!
//! Each value is re-emitted `delay` after it was received, on one worker of a
//! scheduler picked per subscription. The stage keeps at most one element in
//! flight: it requests the next one upstream only after the previous one was
//! delivered, so order is preserved and consecutive values are at least `delay`
//! apart.
//!
//! Errors are not delayed: an error cancels the pending timer and is delivered on
//! the worker right away. Completion waits for the value still pending. Disposing the
//! scheduler while a value is pending fails the subscription with `SchedulerRejected`.
//!
//! # Example
//!
//! ```rust
//! use reflux_publisher::Flux;
//! use reflux_publisher_time::DelayElementsExt;
//! use reflux_scheduler::Scheduler;
//! use reflux_test_utils::TestProbe;
//! use std::time::Duration;
//!
//! let scheduler = Scheduler::new_worker_pool("delay-docs", 1);
//! let delayed = Flux::range(1, 2).delay_elements_on(Duration::from_millis(5), scheduler.clone());
//!
//! let probe = TestProbe::attach_with_request(&delayed, u64::MAX);
//! assert!(probe.await_terminal(Duration::from_secs(1)));
//! assert_eq!(probe.values(), vec![1, 2]);
//! scheduler.dispose();
//! ```

use parking_lot::Mutex;
use reflux_core::{
    add_demand, hooks, produced, BoxSubscriber, Publisher, RefluxError, SharedPublisher,
    SharedSubscription, Signal, Subscriber, Subscription,
};
use reflux_publisher::Flux;
use reflux_scheduler::{ScheduledTask, Scheduler, Worker};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Extension trait providing the `delay_elements` operator.
pub trait DelayElementsExt<T>: Sized {
    /// Delays every value by `delay` on the process-wide parallel scheduler.
    fn delay_elements(self, delay: Duration) -> Flux<T>;

    /// Delays every value by `delay` on a worker of `scheduler`.
    ///
    /// A submission the scheduler rejects fails the subscription with
    /// `SchedulerRejected`.
    fn delay_elements_on(self, delay: Duration, scheduler: Scheduler) -> Flux<T>;
}

impl<T: Send + 'static> DelayElementsExt<T> for Flux<T> {
    fn delay_elements(self, delay: Duration) -> Flux<T> {
        self.delay_elements_on(delay, Scheduler::parallel())
    }

    fn delay_elements_on(self, delay: Duration, scheduler: Scheduler) -> Flux<T> {
        Flux::from_publisher(DelayElements {
            source: self.as_publisher(),
            delay,
            scheduler,
        })
    }
}

struct DelayElements<T> {
    source: SharedPublisher<T>,
    delay: Duration,
    scheduler: Scheduler,
}

impl<T: Send + 'static> Publisher<T> for DelayElements<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        let stage = Arc::new_cyclic(|me| DelayStage {
            me: me.clone(),
            delay: self.delay,
            worker: self.scheduler.create_worker(),
            downstream: Mutex::new(Some(downstream)),
            state: Mutex::new(DelayState::default()),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        });

        self.source.attach(Box::new(DelaySubscriber { stage }));
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Upstream {
    #[default]
    Active,
    Completed,
    Failed,
}

#[derive(Default)]
struct DelayState {
    upstream: Option<SharedSubscription>,
    upstream_state: Upstream,
    // Demand is recorded but not forwarded while the downstream runs on_subscribe.
    subscribing: bool,
    awaiting: bool,
    timer: Option<ScheduledTask>,
    // Set when a failure arrives while the downstream is out of its slot.
    failure: Option<RefluxError>,
    terminated: bool,
}

struct DelayStage<T> {
    me: Weak<DelayStage<T>>,
    delay: Duration,
    worker: Worker,
    // Taken out while a delivery is running.
    downstream: Mutex<Option<BoxSubscriber<T>>>,
    state: Mutex<DelayState>,
    requested: AtomicU64,
    cancelled: AtomicBool,
}

impl<T: Send + 'static> DelayStage<T> {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Requests one element upstream if downstream wants one and none is in flight.
    fn pump(&self) {
        let upstream = {
            let mut state = self.state.lock();
            if state.subscribing
                || state.awaiting
                || state.upstream_state != Upstream::Active
                || self.is_cancelled()
                || self.requested.load(Ordering::Acquire) == 0
            {
                return;
            }
            state.awaiting = true;
            state.upstream.clone()
        };

        if let Some(upstream) = upstream {
            upstream.request(1);
        }
    }

    fn schedule_value(&self, value: T) {
        let Some(stage) = self.me.upgrade() else {
            return;
        };

        let mut state = self.state.lock();
        if state.upstream_state != Upstream::Active || self.is_cancelled() {
            drop(state);
            hooks::on_next_dropped("delay_elements");
            return;
        }

        // The timer cannot fire into `emit` before the handle is stored: `emit` locks state first.
        let abandoned = stage.clone();
        match self.worker.schedule_after_or_reject(
            self.delay,
            move || stage.emit(value),
            move |rejected| abandoned.fail(rejected),
        ) {
            Ok(task) => state.timer = Some(task),
            Err(rejected) => {
                drop(state);
                self.fail(rejected);
            }
        }
    }

    fn schedule_terminal(&self, signal: Signal<T>) {
        let Some(stage) = self.me.upgrade() else {
            return;
        };

        if let Err(rejected) = self.worker.schedule(move || stage.terminate(signal)) {
            self.fail(rejected);
        }
    }

    /// Runs on the worker when a value's delay elapsed.
    fn emit(&self, value: T) {
        let completed = {
            let mut state = self.state.lock();
            state.timer = None;
            state.awaiting = false;
            state.upstream_state == Upstream::Completed
        };

        if self.is_cancelled() {
            return;
        }
        let Some(mut downstream) = self.downstream.lock().take() else {
            hooks::on_next_dropped("delay_elements");
            return;
        };

        produced(&self.requested, 1);
        downstream.on_next(value);

        if self.restore(downstream, completed) {
            self.pump();
        }
    }

    /// Runs on the worker for completion and upstream errors.
    fn terminate(&self, signal: Signal<T>) {
        let taken = if self.is_cancelled() {
            None
        } else {
            self.downstream.lock().take()
        };

        match taken {
            Some(mut downstream) => signal.deliver(&mut *downstream),
            None => {
                if let Signal::Error(error) = &signal {
                    hooks::on_error_dropped(error);
                }
            }
        }
        self.release();
    }

    /// Puts the downstream back after a delivery. Returns `false` if the sequence
    /// ended meanwhile, delivering a recorded failure or `completed` first.
    fn restore(&self, mut downstream: BoxSubscriber<T>, completed: bool) -> bool {
        let mut slot = self.downstream.lock();
        let failure = self.state.lock().failure.take();
        if failure.is_none() && !completed && !self.is_cancelled() {
            *slot = Some(downstream);
            return true;
        }
        drop(slot);

        if !self.is_cancelled() {
            match failure {
                Some(error) => downstream.on_error(error),
                None => downstream.on_complete(),
            }
        }
        self.release();
        false
    }

    /// Ends the subscription with `error` from whichever thread detected it.
    fn fail(&self, error: RefluxError) {
        warn!("delay_elements: {}", error);
        let (upstream, timer) = {
            let mut state = self.state.lock();
            state.upstream_state = Upstream::Failed;
            (state.upstream.take(), state.timer.take())
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(upstream) = upstream {
            upstream.cancel();
        }

        let mut slot = self.downstream.lock();
        match slot.take() {
            Some(mut downstream) => {
                drop(slot);
                if !self.is_cancelled() {
                    downstream.on_error(error);
                }
                self.release();
            }
            None => {
                let mut state = self.state.lock();
                if state.terminated {
                    drop(state);
                    drop(slot);
                    hooks::on_error_dropped(&error);
                } else {
                    // Delivered by the running delivery once it returns.
                    state.failure = Some(error);
                }
            }
        }
    }

    fn release(&self) {
        let timer = {
            let mut state = self.state.lock();
            state.terminated = true;
            state.upstream = None;
            state.timer.take()
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
    }
}

impl<T: Send + 'static> Subscription for DelayStage<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            self.fail(RefluxError::protocol_violation(
                "request(n) called with n == 0",
            ));
            return;
        }
        add_demand(&self.requested, n);
        self.pump();
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let (upstream, timer) = {
            let mut state = self.state.lock();
            (state.upstream.take(), state.timer.take())
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(upstream) = upstream {
            upstream.cancel();
        }

        let downstream = self.downstream.lock().take();
        drop(downstream);
    }
}

struct DelaySubscriber<T> {
    stage: Arc<DelayStage<T>>,
}

impl<T: Send + 'static> Subscriber<T> for DelaySubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        {
            let mut state = self.stage.state.lock();
            if state.upstream.is_some() || state.terminated {
                drop(state);
                warn!("delay_elements: duplicate on_subscribe, cancelling the new subscription");
                subscription.cancel();
                return;
            }
            state.upstream = Some(subscription);
            state.subscribing = true;
        }

        let downstream = self.stage.downstream.lock().take();
        let restored = match downstream {
            Some(mut downstream) => {
                downstream.on_subscribe(self.stage.clone());
                self.stage.restore(downstream, false)
            }
            None => false,
        };

        self.stage.state.lock().subscribing = false;
        if restored {
            self.stage.pump();
        }
    }

    fn on_next(&mut self, value: T) {
        self.stage.schedule_value(value);
    }

    fn on_error(&mut self, error: RefluxError) {
        let timer = {
            let mut state = self.stage.state.lock();
            if state.upstream_state != Upstream::Active {
                drop(state);
                hooks::on_error_dropped(&error);
                return;
            }
            state.upstream_state = Upstream::Failed;
            state.upstream = None;
            state.timer.take()
        };

        if let Some(timer) = timer {
            timer.cancel();
        }
        self.stage.schedule_terminal(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        let value_pending = {
            let mut state = self.stage.state.lock();
            if state.upstream_state != Upstream::Active {
                return;
            }
            state.upstream_state = Upstream::Completed;
            state.upstream = None;
            state.timer.is_some()
        };

        // Otherwise `emit` completes once the pending value is out.
        if !value_pending {
            self.stage.schedule_terminal(Signal::Complete);
        }
    }
}
