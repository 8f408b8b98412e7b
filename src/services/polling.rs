//! Cancellable periodic work on a background thread.
//!
//! Used by the dashboard refresh and the session monitor. A task stops when it
//! is cancelled or dropped; the tick in progress, if any, runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct PeriodicTask {
    name: String,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Run `tick` every `period`, first after one full period
    pub fn spawn<F>(name: &str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        log::debug!("Periodic task '{}' stopped", thread_name);
                        break;
                    }
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("Failed to start periodic task '{}': {}", name, err);
                None
            }
        };

        Self {
            name: name.to_string(),
            stop: Some(stop_tx),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_some()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop scheduling further ticks without waiting for the thread
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Cancel and wait for the worker to exit
    pub fn join(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Periodic task '{}' panicked", self.name);
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// At most one holder at a time; overlapping work is skipped, never queued
#[derive(Debug, Clone, Default)]
pub struct InFlightGate {
    busy: Arc<AtomicBool>,
}

impl InFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` while another holder is active
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_gate_allows_one_holder() {
        let gate = InFlightGate::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());
        assert!(gate.clone().try_begin().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_task_ticks_until_cancelled() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let task = PeriodicTask::spawn("test-ticker", Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(60));
        task.join();
        let after_join = ticks.load(Ordering::SeqCst);
        assert!(after_join >= 1);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_join);
    }

    #[test]
    fn test_cancelled_task_reports_not_running() {
        let mut task = PeriodicTask::spawn("test-idle", Duration::from_secs(60), || {});
        assert!(task.is_running());
        task.cancel();
        assert!(!task.is_running());
        assert_eq!(task.name(), "test-idle");
    }
}
