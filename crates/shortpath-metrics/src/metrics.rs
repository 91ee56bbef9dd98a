use crate::collector::Collector;
use crate::error::MetricsError;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Collector fed with the domain of every newly allocated target URL.
pub const DOMAIN_SHORTENS: &str = "domain_shortens";

/// Pending increments a collector buffers before producers have to wait.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Registry of named collectors sharing one stop signal.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    collectors: DashMap<String, Collector>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stop: CancellationToken,
    queue_capacity: usize,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a registry whose collectors buffer up to `queue_capacity`
    /// pending increments (at least one).
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                collectors: DashMap::new(),
                workers: Mutex::new(Vec::new()),
                stop: CancellationToken::new(),
                queue_capacity: queue_capacity.max(1),
            }),
        }
    }

    /// Returns the collector called `name`, starting it on first use.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn collector(&self, name: &str) -> Result<Collector, MetricsError> {
        // Checked under the workers lock so a racing shutdown either sees
        // the new worker or refuses it.
        let mut workers = self.inner.workers.lock();
        if self.inner.stop.is_cancelled() {
            return Err(MetricsError::Stopped(name.to_string()));
        }

        let collector = self
            .inner
            .collectors
            .entry(name.to_owned())
            .or_insert_with(|| {
                let (collector, worker) = Collector::spawn(
                    name,
                    self.inner.queue_capacity,
                    self.inner.stop.child_token(),
                );
                workers.push(worker);
                debug!(collector = %name, "Started collector");
                collector
            })
            .clone();

        Ok(collector)
    }

    /// Names of all started collectors.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .collectors
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Stops every collector and waits for the workers to finish.
    ///
    /// Increments already queued are applied; producers still waiting on a
    /// full queue are released with [`MetricsError::Stopped`]. Counts stay
    /// readable through existing [`Collector`] handles.
    pub async fn shutdown(&self) {
        let workers = {
            let mut workers = self.inner.workers.lock();
            self.inner.stop.cancel();
            std::mem::take(&mut *workers)
        };
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Collector worker failed");
            }
        }
    }
}
