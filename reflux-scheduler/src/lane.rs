// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_channel::{Receiver, Sender, TrySendError};
use reflux_core::fault::catch_fault;
use reflux_core::{CancellationToken, RefluxError, Result};
use std::thread;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinSet;

/// Unit of work executed on a lane.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Called on the lane instead of a delayed job that can no longer run.
pub type Rejection = Box<dyn FnOnce(RefluxError) + Send + 'static>;

pub(crate) enum Command {
    Run(Job),
    RunAfter(Delayed),
}

pub(crate) struct Delayed {
    pub(crate) delay: Duration,
    pub(crate) job: Job,
    pub(crate) on_reject: Option<Rejection>,
    pub(crate) token: CancellationToken,
}

impl Delayed {
    async fn run(self, lane: String, scheduler: String, shutdown: CancellationToken) {
        let Self {
            delay,
            job,
            on_reject,
            token,
        } = self;

        tokio::select! {
            () = tokio::time::sleep(delay) => {
                if !token.is_cancelled() {
                    run_job(&lane, job);
                }
            }
            () = token.cancelled() => {}
            () = shutdown.cancelled() => {
                if token.is_cancelled() {
                    return;
                }
                debug!("lane {}: delayed job abandoned on dispose", lane);
                if let Some(on_reject) = on_reject {
                    let rejected = RefluxError::scheduler_rejected(scheduler, "scheduler disposed");
                    run_job(&lane, Box::new(move || on_reject(rejected)));
                }
            }
        }
    }
}

/// One worker thread and the sending half of its queue.
pub(crate) struct Lane {
    name: String,
    sender: Sender<Command>,
}

impl Lane {
    pub(crate) fn spawn(
        scheduler: &str,
        name: String,
        queue_capacity: Option<usize>,
    ) -> Result<Self> {
        let (sender, receiver) = match queue_capacity {
            Some(capacity) => async_channel::bounded(capacity),
            None => async_channel::unbounded(),
        };

        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| RefluxError::scheduler_rejected(&name, e.to_string()))?;

        let lane_name = name.clone();
        let scheduler = scheduler.to_string();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_lane(&lane_name, &scheduler, &runtime, &receiver))
            .map_err(|e| RefluxError::scheduler_rejected(&name, e.to_string()))?;

        Ok(Self { name, sender })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn submit(&self, command: Command) -> Result<()> {
        self.sender.try_send(command).map_err(|e| {
            let reason = match e {
                TrySendError::Full(_) => "lane queue full",
                TrySendError::Closed(_) => "scheduler disposed",
            };
            warn!("lane {}: rejected job ({})", self.name, reason);
            RefluxError::scheduler_rejected(&self.name, reason)
        })
    }

    pub(crate) fn close(&self) {
        self.sender.close();
    }
}

fn run_lane(name: &str, scheduler: &str, runtime: &Runtime, receiver: &Receiver<Command>) {
    debug!("lane {} started", name);

    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let mut delayed = JoinSet::new();

        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Ok(Command::Run(job)) => run_job(name, job),
                    Ok(Command::RunAfter(job)) => {
                        delayed.spawn(job.run(name.to_string(), scheduler.to_string(), shutdown.clone()));
                    }
                    Err(_) => break,
                },
                Some(_) = delayed.join_next(), if !delayed.is_empty() => {}
            }
        }

        // Queue closed and drained: pending delays are rejected, not dropped.
        shutdown.cancel();
        while delayed.join_next().await.is_some() {}
    });

    debug!("lane {} stopped", name);
}

fn run_job(name: &str, job: Job) {
    if let Err(fault) = catch_fault(job) {
        error!("lane {}: job panicked: {}", name, fault);
    }
}
