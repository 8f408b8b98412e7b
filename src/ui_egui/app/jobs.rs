//! One-shot background jobs whose results are collected on the UI thread.
//!
//! Each job runs on its own short-lived thread and sends exactly one message.
//! Messages are drained once per frame, in arrival order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

pub struct JobRunner<M> {
    sender: Sender<M>,
    receiver: Receiver<M>,
    in_flight: Arc<AtomicUsize>,
}

impl<M: Send + 'static> JobRunner<M> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn spawn<F>(&self, name: &str, job: F)
    where
        F: FnOnce() -> M + Send + 'static,
    {
        let sender = self.sender.clone();
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name(format!("job-{}", name))
            .spawn(move || {
                let message = job();
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = sender.send(message);
            });

        if let Err(err) = spawned {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            log::error!("Failed to start job '{}': {}", name, err);
        }
    }

    /// Everything finished since the last call
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }
}

impl<M: Send + 'static> Default for JobRunner<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn drain_until<M: Send + 'static>(runner: &JobRunner<M>, count: usize) -> Vec<M> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut messages = Vec::new();
        while messages.len() < count && Instant::now() < deadline {
            messages.extend(runner.drain());
            thread::sleep(Duration::from_millis(2));
        }
        messages
    }

    #[test]
    fn test_results_are_delivered() {
        let runner = JobRunner::new();
        runner.spawn("one", || 1);
        runner.spawn("two", || 2);

        let mut results = drain_until(&runner, 2);
        results.sort();
        assert_eq!(results, vec![1, 2]);
        assert!(runner.is_idle());
    }

    #[test]
    fn test_in_flight_counts_running_jobs() {
        let runner = JobRunner::new();
        runner.spawn("slow", || {
            thread::sleep(Duration::from_millis(50));
            "done"
        });
        assert_eq!(runner.in_flight(), 1);
        assert_eq!(drain_until(&runner, 1), vec!["done"]);
        assert_eq!(runner.in_flight(), 0);
    }
}
