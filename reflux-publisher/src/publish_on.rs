// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hand-off of downstream delivery to a scheduler worker.
//!
//! Upstream signals are queued and drained on a single [`Worker`] picked when the
//! subscription is created, so every downstream `on_next`, `on_error` and
//! `on_complete` of that subscription runs on the same lane.
//!
//! Upstream demand never exceeds what the downstream requested. It is also capped by a
//! prefetch window: at most `prefetch` elements are requested but not yet delivered,
//! and once the window is open the stage refills it in batches of
//! `prefetch - prefetch / 4` (or the smaller outstanding demand).

use parking_lot::Mutex;
use reflux_core::{
    add_demand, hooks, produced, BoxSubscriber, ContinueStrategy, Publisher, RefluxError,
    SharedPublisher, SharedSubscription, Subscriber, Subscription, UNBOUNDED,
};
use reflux_scheduler::{Scheduler, Worker};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Default cap on elements requested upstream but not yet delivered downstream.
pub const DEFAULT_PREFETCH: usize = 256;

pub(crate) fn publish_on_stage<T>(
    source: SharedPublisher<T>,
    scheduler: Scheduler,
    prefetch: usize,
) -> SharedPublisher<T>
where
    T: Send + 'static,
{
    Arc::new(PublishOnPublisher {
        source,
        scheduler,
        prefetch: prefetch.max(1),
    })
}

struct PublishOnPublisher<T> {
    source: SharedPublisher<T>,
    scheduler: Scheduler,
    prefetch: usize,
}

impl<T: Send + 'static> Publisher<T> for PublishOnPublisher<T> {
    fn attach(&self, downstream: BoxSubscriber<T>) {
        let strategy = downstream.continue_strategy();
        let prefetch = self.prefetch;
        let stage = Arc::new_cyclic(|me| PublishOnStage {
            me: me.clone(),
            worker: self.scheduler.create_worker(),
            prefetch,
            limit: (prefetch - prefetch / 4).max(1),
            queue: Mutex::new(VecDeque::new()),
            error: Mutex::new(None),
            violation: Mutex::new(None),
            upstream: Mutex::new(None),
            drain: Mutex::new(DrainState {
                downstream: Some(downstream),
            }),
            demand: Mutex::new(Forwarding::default()),
            requested: AtomicU64::new(0),
            wip: AtomicUsize::new(0),
            done: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        });

        self.source.attach(Box::new(PublishOnSubscriber { stage, strategy }));
    }
}

struct DrainState<T> {
    downstream: Option<BoxSubscriber<T>>,
}

/// Cumulative demand bookkeeping between the downstream and upstream.
#[derive(Debug, Default)]
struct Forwarding {
    received: u64,
    forwarded: u64,
    delivered: u64,
}

impl Forwarding {
    /// How much may be requested upstream now, if anything is worth a request.
    fn next_request(&self, prefetch: u64, limit: u64) -> Option<u64> {
        let in_flight = self.forwarded.saturating_sub(self.delivered);
        let window = prefetch.saturating_sub(in_flight);
        let owed = if self.received == UNBOUNDED {
            UNBOUNDED
        } else {
            self.received.saturating_sub(self.forwarded)
        };

        let n = window.min(owed);
        // Small refills wait for a full batch unless they cover everything owed.
        (n > 0 && n >= owed.min(limit)).then_some(n)
    }
}

struct PublishOnStage<T> {
    me: Weak<PublishOnStage<T>>,
    worker: Worker,
    prefetch: usize,
    limit: usize,
    queue: Mutex<VecDeque<T>>,
    error: Mutex<Option<RefluxError>>,
    // Reported ahead of queued values.
    violation: Mutex<Option<RefluxError>>,
    upstream: Mutex<Option<SharedSubscription>>,
    // Only locked by the current drainer.
    drain: Mutex<DrainState<T>>,
    demand: Mutex<Forwarding>,
    requested: AtomicU64,
    wip: AtomicUsize,
    done: AtomicBool,
    cancelled: AtomicBool,
}

impl<T: Send + 'static> PublishOnStage<T> {
    fn upstream(&self) -> Option<SharedSubscription> {
        self.upstream.lock().clone()
    }

    /// Forwards demand upstream, counting `delivered` newly consumed elements.
    fn replenish(&self, delivered: u64) {
        let n = {
            let mut demand = self.demand.lock();
            demand.delivered = demand.delivered.saturating_add(delivered);
            if self.cancelled.load(Ordering::Acquire) {
                return;
            }
            let Some(n) = demand.next_request(self.prefetch as u64, self.limit as u64) else {
                return;
            };
            demand.forwarded = demand.forwarded.saturating_add(n);
            n
        };

        if let Some(upstream) = self.upstream() {
            upstream.request(n);
        }
    }

    fn schedule(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.submit_drain();
        }
    }

    /// Called by the wip owner only.
    fn submit_drain(&self) {
        let Some(stage) = self.me.upgrade() else {
            return;
        };

        if let Err(rejected) = self.worker.schedule(move || stage.drain()) {
            // Still holding wip: deliver the rejection inline and never drain again.
            self.cancelled.store(true, Ordering::Release);
            if let Some(upstream) = self.upstream.lock().take() {
                upstream.cancel();
            }
            self.queue.lock().clear();
            let downstream = self.drain.lock().downstream.take();
            if let Some(mut downstream) = downstream {
                downstream.on_error(rejected);
            }
        }
    }

    fn drain(&self) {
        let mut missed = 1;
        let mut state = self.drain.lock();

        loop {
            if self.drain_once(&mut state) {
                return;
            }
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                return;
            }
        }
    }

    /// Returns `true` once the subscription is finished; wip is then never released.
    fn drain_once(&self, state: &mut DrainState<T>) -> bool {
        let Some(downstream) = state.downstream.as_mut() else {
            return true;
        };

        let requested = self.requested.load(Ordering::Acquire);
        let mut emitted = 0_u64;

        loop {
            if self.cancelled.load(Ordering::Acquire) {
                self.queue.lock().clear();
                state.downstream = None;
                return true;
            }

            if let Some(violation) = self.violation.lock().take() {
                self.queue.lock().clear();
                if let Some(mut downstream) = state.downstream.take() {
                    downstream.on_error(violation);
                }
                return true;
            }

            let done = self.done.load(Ordering::Acquire);
            let empty = self.queue.lock().is_empty();
            if done && empty {
                let error = self.error.lock().take();
                let mut downstream = state.downstream.take();
                if let Some(downstream) = downstream.as_mut() {
                    match error {
                        Some(error) => downstream.on_error(error),
                        None => downstream.on_complete(),
                    }
                }
                return true;
            }

            if emitted == requested || empty {
                break;
            }

            let Some(value) = self.queue.lock().pop_front() else {
                break;
            };
            downstream.on_next(value);
            emitted += 1;
            self.replenish(1);
        }

        if emitted > 0 {
            produced(&self.requested, emitted);
        }
        false
    }
}

impl<T: Send + 'static> Subscription for PublishOnStage<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            let violation = RefluxError::protocol_violation("request(n) called with n == 0");
            warn!("publish_on: {}", violation);
            *self.violation.lock() = Some(violation);
            if let Some(upstream) = self.upstream.lock().take() {
                upstream.cancel();
            }
            self.schedule();
            return;
        }
        add_demand(&self.requested, n);
        {
            let mut demand = self.demand.lock();
            demand.received = demand.received.saturating_add(n);
        }
        self.replenish(0);
        self.schedule();
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(upstream) = self.upstream.lock().take() {
            upstream.cancel();
        }
        // Not draining: release the queue and the downstream now.
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.queue.lock().clear();
            self.drain.lock().downstream = None;
        }
    }
}

struct PublishOnSubscriber<T> {
    stage: Arc<PublishOnStage<T>>,
    strategy: Option<ContinueStrategy>,
}

impl<T: Send + 'static> Subscriber<T> for PublishOnSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SharedSubscription) {
        *self.stage.upstream.lock() = Some(subscription.clone());

        // Hold wip so no drain can start while the downstream is out of its slot.
        self.stage.wip.fetch_add(1, Ordering::AcqRel);
        let downstream = self.stage.drain.lock().downstream.take();
        if let Some(mut downstream) = downstream {
            downstream.on_subscribe(self.stage.clone());
            self.stage.drain.lock().downstream = Some(downstream);
        }

        self.stage.submit_drain();
    }

    fn on_next(&mut self, value: T) {
        if self.stage.done.load(Ordering::Acquire) || self.stage.cancelled.load(Ordering::Acquire) {
            hooks::on_next_dropped("publish_on");
            return;
        }
        self.stage.queue.lock().push_back(value);
        self.stage.schedule();
    }

    fn on_error(&mut self, error: RefluxError) {
        if self.stage.done.load(Ordering::Acquire) {
            hooks::on_error_dropped(&error);
            return;
        }
        *self.stage.error.lock() = Some(error);
        self.stage.done.store(true, Ordering::Release);
        self.stage.schedule();
    }

    fn on_complete(&mut self) {
        if self.stage.done.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stage.schedule();
    }

    fn continue_strategy(&self) -> Option<ContinueStrategy> {
        self.strategy.clone()
    }
}
