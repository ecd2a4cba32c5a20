// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use reflux_core::RefluxError;
use reflux_scheduler::{Scheduler, SchedulerConfig};
use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn current_thread_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

#[test]
fn test_job_runs_on_named_lane() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("pub-parallel", 4);
    let worker = scheduler.create_worker();
    let (tx, rx) = mpsc::channel();

    // Act
    worker.schedule(move || {
        let _ = tx.send(current_thread_name());
    })?;

    // Assert
    let name = rx.recv_timeout(TIMEOUT)?;
    assert!(name.starts_with("pub-parallel-"));
    assert_eq!(Some(name.as_str()), worker.lane_name());
    scheduler.dispose();
    Ok(())
}

#[test]
fn test_workers_are_assigned_round_robin() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("rr", 3);

    // Act
    let lanes: Vec<String> = (0..6)
        .map(|_| {
            scheduler
                .create_worker()
                .lane_name()
                .unwrap_or_default()
                .to_string()
        })
        .collect();

    // Assert
    let distinct: HashSet<_> = lanes[..3].iter().collect();
    assert_eq!(distinct.len(), 3);
    assert_eq!(lanes[..3], lanes[3..]);
    scheduler.dispose();
    Ok(())
}

#[test]
fn test_jobs_on_one_worker_run_in_order_on_one_thread() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("sticky", 4);
    let worker = scheduler.create_worker();
    let (tx, rx) = mpsc::channel();

    // Act
    for i in 0..50 {
        let tx = tx.clone();
        worker.schedule(move || {
            let _ = tx.send((i, current_thread_name()));
        })?;
    }
    drop(tx);

    // Assert
    let received: Vec<(i32, String)> = (0..50)
        .map(|_| rx.recv_timeout(TIMEOUT))
        .collect::<Result<_, _>>()?;
    let order: Vec<i32> = received.iter().map(|(i, _)| *i).collect();
    let threads: HashSet<&String> = received.iter().map(|(_, t)| t).collect();
    assert_eq!(order, (0..50).collect::<Vec<_>>());
    assert_eq!(threads.len(), 1);
    scheduler.dispose();
    Ok(())
}

#[test]
fn test_panicking_job_does_not_kill_lane() -> anyhow::Result<()> {
    // Arrange
    let scheduler = Scheduler::new_worker_pool("resilient", 1);
    let worker = scheduler.create_worker();
    let (tx, rx) = mpsc::channel();

    // Act
    worker.schedule(|| panic!("job failure"))?;
    worker.schedule(move || {
        let _ = tx.send("still alive");
    })?;

    // Assert
    assert_eq!(rx.recv_timeout(TIMEOUT)?, "still alive");
    scheduler.dispose();
    Ok(())
}

#[test]
fn test_full_lane_queue_rejects_submission() -> anyhow::Result<()> {
    // Arrange
    let scheduler =
        Scheduler::with_config(SchedulerConfig::new("bounded").with_size(1).with_queue_capacity(1));
    let worker = scheduler.create_worker();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    worker.schedule(move || {
        let _ = started_tx.send(());
        let _ = release_rx.recv_timeout(TIMEOUT);
    })?;
    started_rx.recv_timeout(TIMEOUT)?;
    worker.schedule(|| {})?;

    // Act
    let rejected = worker.schedule(|| {});

    // Assert
    assert!(matches!(
        rejected,
        Err(RefluxError::SchedulerRejected { ref scheduler, .. }) if scheduler == "bounded-1"
    ));
    release_tx.send(())?;
    scheduler.dispose();
    Ok(())
}
