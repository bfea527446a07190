// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rate-limited command dispatcher.
//!
//! Producers submit values without blocking; each submission replaces the
//! previous pending value. A single background worker waits for a value,
//! sleeps out the minimum interval since its last call, drains whatever
//! arrived meanwhile, and hands only the latest value to the sink. Sink
//! failures are logged and never stop the worker.

pub mod sinks;

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Receiver of dispatched values. Runs on the dispatcher's worker thread.
pub trait CommandSink<T>: Send {
    fn apply(&mut self, value: T) -> Result<()>;
}

impl<T, F> CommandSink<T> for F
where
    F: FnMut(T) -> Result<()> + Send,
{
    fn apply(&mut self, value: T) -> Result<()> {
        self(value)
    }
}

/// Timing for a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchSettings {
    /// Minimum time between two sink calls.
    pub min_interval: Duration,
    /// Upper bound on how long the worker sleeps before rechecking the stop flag.
    pub poll: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            poll: Duration::from_millis(100),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

/// Outcome of stopping the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStatus {
    Joined,
    /// The worker did not finish in time and was left detached.
    TimedOut,
}

struct Slot<T> {
    pending: Option<T>,
    stop: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    wake: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running dispatcher.
pub struct CommandDispatcher<T: Send + 'static> {
    name: String,
    shared: Arc<Shared<T>>,
    worker: Option<JoinHandle<()>>,
    finished: mpsc::Receiver<()>,
    shutdown_timeout: Duration,
}

impl<T: Send + Debug + 'static> CommandDispatcher<T> {
    /// Start the worker thread.
    pub fn spawn<S>(name: &str, sink: S, settings: DispatchSettings) -> Result<Self>
    where
        S: CommandSink<T> + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                pending: None,
                stop: false,
            }),
            wake: Condvar::new(),
        });
        let (done_tx, finished) = mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker_name = name.to_string();
        let worker = thread::Builder::new()
            .name(format!("{}-dispatch", name))
            .spawn(move || {
                run_worker(&worker_name, &worker_shared, sink, settings);
                let _ = done_tx.send(());
            })
            .with_context(|| format!("Failed to start {} dispatcher", name))?;

        log::debug!("Started {} dispatcher ({:?} interval)", name, settings.min_interval);
        Ok(Self {
            name: name.to_string(),
            shared,
            worker: Some(worker),
            finished,
            shutdown_timeout: settings.shutdown_timeout,
        })
    }

    /// Replace the pending value. Never waits on the worker's sink call.
    pub fn submit(&self, value: T) {
        let mut slot = lock(&self.shared.slot);
        if slot.stop {
            return;
        }
        slot.pending = Some(value);
        drop(slot);
        self.shared.wake.notify_one();
    }

    /// Signal the worker to stop and wait for it, up to the shutdown timeout.
    /// Later calls return `Joined` without waiting.
    pub fn shutdown(&mut self) -> ShutdownStatus {
        let Some(worker) = self.worker.take() else {
            return ShutdownStatus::Joined;
        };
        lock(&self.shared.slot).stop = true;
        self.shared.wake.notify_all();

        match self.finished.recv_timeout(self.shutdown_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.join().is_err() {
                    log::error!("{} dispatcher worker panicked", self.name);
                }
                ShutdownStatus::Joined
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "{} dispatcher did not stop within {:?}; detaching",
                    self.name,
                    self.shutdown_timeout
                );
                ShutdownStatus::TimedOut
            }
        }
    }
}

impl<T: Send + 'static> Drop for CommandDispatcher<T> {
    fn drop(&mut self) {
        // Without a join: dropping must not stall the frame thread.
        if self.worker.take().is_some() {
            lock(&self.shared.slot).stop = true;
            self.shared.wake.notify_all();
        }
    }
}

fn run_worker<T, S>(name: &str, shared: &Shared<T>, mut sink: S, settings: DispatchSettings)
where
    T: Debug,
    S: CommandSink<T>,
{
    let mut last_call: Option<Instant> = None;

    while let Some(first) = wait_for_value(shared, settings.poll) {
        if let Some(last) = last_call {
            let deadline = last + settings.min_interval;
            if !wait_until(shared, deadline, settings.poll) {
                break;
            }
        }

        // Keep only the newest value that arrived while we waited.
        let mut latest = first;
        let mut superseded = 0usize;
        {
            let mut slot = lock(&shared.slot);
            while let Some(newer) = slot.pending.take() {
                latest = newer;
                superseded += 1;
            }
        }
        if superseded > 0 {
            log::debug!("{}: coalesced {} superseded value(s)", name, superseded);
        }

        log::debug!("{}: dispatching {:?}", name, latest);
        match panic::catch_unwind(AssertUnwindSafe(|| sink.apply(latest))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("{}: command failed: {:#}", name, e),
            Err(_) => log::error!("{}: command panicked", name),
        }
        last_call = Some(Instant::now());
    }
    log::debug!("{} dispatcher stopped", name);
}

/// Block until a value is pending. `None` once stop is requested.
fn wait_for_value<T>(shared: &Shared<T>, poll: Duration) -> Option<T> {
    let mut slot = lock(&shared.slot);
    loop {
        if slot.stop {
            return None;
        }
        if let Some(value) = slot.pending.take() {
            return Some(value);
        }
        slot = shared
            .wake
            .wait_timeout(slot, poll)
            .map(|(guard, _)| guard)
            .unwrap_or_else(|e| e.into_inner().0);
    }
}

/// Sleep until `deadline`, waking early only to honour stop. Returns false
/// when stopped.
fn wait_until<T>(shared: &Shared<T>, deadline: Instant, poll: Duration) -> bool {
    let mut slot = lock(&shared.slot);
    loop {
        if slot.stop {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let wait = (deadline - now).min(poll);
        slot = shared
            .wake
            .wait_timeout(slot, wait)
            .map(|(guard, _)| guard)
            .unwrap_or_else(|e| e.into_inner().0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    type Calls = Arc<Mutex<Vec<(u8, Instant)>>>;

    fn recorder() -> (Calls, impl FnMut(u8) -> Result<()> + Send + 'static) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink_calls = Arc::clone(&calls);
        let sink = move |v: u8| -> Result<()> {
            sink_calls.lock().unwrap().push((v, Instant::now()));
            Ok(())
        };
        (calls, sink)
    }

    fn values(calls: &Calls) -> Vec<u8> {
        calls.lock().unwrap().iter().map(|(v, _)| *v).collect()
    }

    fn wait_for_calls(calls: &Calls, n: usize, limit: Duration) {
        let start = Instant::now();
        while calls.lock().unwrap().len() < n && start.elapsed() < limit {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_burst_coalesces_to_latest() {
        let (calls, sink) = recorder();
        let mut d = CommandDispatcher::spawn("test", sink, DispatchSettings::default()).unwrap();

        // First call opens the rate-limit window.
        d.submit(1);
        wait_for_calls(&calls, 1, Duration::from_secs(2));

        d.submit(10);
        d.submit(20);
        d.submit(35);
        thread::sleep(Duration::from_millis(1200));

        assert_eq!(values(&calls), vec![1, 35]);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
    }

    #[test]
    fn test_calls_respect_min_interval() {
        let (calls, sink) = recorder();
        let mut d = CommandDispatcher::spawn("test", sink, DispatchSettings::default()).unwrap();

        d.submit(40);
        thread::sleep(Duration::from_millis(100));
        d.submit(60);
        wait_for_calls(&calls, 2, Duration::from_secs(3));

        let recorded = calls.lock().unwrap().clone();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].0, 60);
        assert!(recorded[1].1 - recorded[0].1 >= Duration::from_millis(500));
        drop(recorded);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
    }

    #[test]
    fn test_failures_do_not_stop_worker() {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink_calls = Arc::clone(&calls);
        let sink = move |v: u8| -> Result<()> {
            sink_calls.lock().unwrap().push((v, Instant::now()));
            match v {
                1 => bail!("service unavailable"),
                2 => panic!("service crashed"),
                _ => Ok(()),
            }
        };
        let settings = DispatchSettings {
            min_interval: Duration::from_millis(10),
            ..DispatchSettings::default()
        };
        let mut d = CommandDispatcher::spawn("test", sink, settings).unwrap();

        for v in 1..=3 {
            d.submit(v);
            wait_for_calls(&calls, v as usize, Duration::from_secs(2));
        }
        assert_eq!(values(&calls), vec![1, 2, 3]);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
    }

    #[test]
    fn test_shutdown_while_idle_is_prompt() {
        let (_calls, sink) = recorder();
        let mut d = CommandDispatcher::spawn("test", sink, DispatchSettings::default()).unwrap();
        let start = Instant::now();
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_stuck_sink_times_out() {
        let sink = |_v: u8| -> Result<()> {
            thread::sleep(Duration::from_millis(1500));
            Ok(())
        };
        let settings = DispatchSettings {
            shutdown_timeout: Duration::from_millis(100),
            ..DispatchSettings::default()
        };
        let mut d = CommandDispatcher::spawn("test", sink, settings).unwrap();
        d.submit(5);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(d.shutdown(), ShutdownStatus::TimedOut);
    }

    #[test]
    fn test_repeat_shutdown_returns_joined() {
        let (calls, sink) = recorder();
        let mut d = CommandDispatcher::spawn("test", sink, DispatchSettings::default()).unwrap();
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);

        d.submit(5);
        assert_eq!(d.shutdown(), ShutdownStatus::Joined);
        assert!(values(&calls).is_empty());
    }
}
