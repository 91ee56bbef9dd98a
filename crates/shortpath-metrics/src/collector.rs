use crate::error::MetricsError;
use crate::heap::{CountHeap, KeyCount};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Handle to one named frequency counter.
///
/// Cloning is cheap; every clone feeds the same queue and reads the same
/// counts.
#[derive(Debug, Clone)]
pub struct Collector {
    name: Arc<str>,
    queue: mpsc::Sender<String>,
    counts: Arc<Mutex<CountHeap>>,
}

impl Collector {
    /// Creates a collector and spawns the worker that owns its heap updates.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        name: &str,
        queue_capacity: usize,
        stop: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (queue, pending) = mpsc::channel(queue_capacity);
        let counts = Arc::new(Mutex::new(CountHeap::new()));
        let name: Arc<str> = Arc::from(name);

        let worker = tokio::spawn(run_worker(
            Arc::clone(&name),
            pending,
            Arc::clone(&counts),
            stop,
        ));

        (
            Self {
                name,
                queue,
                counts,
            },
            worker,
        )
    }

    /// Queues one occurrence of `key`.
    ///
    /// Waits while the queue is full. Fails only once the collector has been
    /// stopped.
    pub async fn inc(&self, key: impl Into<String>) -> Result<(), MetricsError> {
        self.queue
            .send(key.into())
            .await
            .map_err(|_| MetricsError::Stopped(self.name.to_string()))
    }

    /// Returns up to `n` keys with the highest counts, highest first.
    pub fn top(&self, n: usize) -> Vec<KeyCount> {
        self.counts.lock().top_n(n)
    }
}

async fn run_worker(
    name: Arc<str>,
    mut pending: mpsc::Receiver<String>,
    counts: Arc<Mutex<CountHeap>>,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            key = pending.recv() => match key {
                Some(key) => {
                    let count = counts.lock().increment_or_insert(&key);
                    trace!(collector = %name, key = %key, count, "Counted");
                }
                None => {
                    debug!(collector = %name, "All producers gone, collector exiting");
                    return;
                }
            },
        }
    }

    // Refuse new entries, then apply whatever was already accepted.
    pending.close();
    let mut drained = 0usize;
    while let Ok(key) = pending.try_recv() {
        counts.lock().increment_or_insert(&key);
        drained += 1;
    }
    debug!(collector = %name, drained, "Collector stopped");
}
