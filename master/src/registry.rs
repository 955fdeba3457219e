// master/src/registry.rs

use chrono::Utc;
use mr_common::WorkerInfo;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Every worker that ever registered, plus the live feeds handed out to
/// scheduling calls. Workers are never removed: the scheduler finds out a
/// worker is gone when a call to it fails.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    workers: Vec<WorkerInfo>,
    feeds: Vec<UnboundedSender<String>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a worker and announces its address on every open feed.
    /// Registering the same address twice announces it twice.
    pub fn register(&self, address: &str, hostname: &str) -> WorkerInfo {
        let info = WorkerInfo {
            worker_id: uuid::Uuid::new_v4().to_string(),
            address: address.to_string(),
            hostname: hostname.to_string(),
            registered_at: Utc::now(),
        };

        let mut state = self.lock();
        // feeds whose receiver was dropped are forgotten here
        state.feeds.retain(|tx| tx.send(info.address.clone()).is_ok());
        state.workers.push(info.clone());
        info
    }

    /// A new feed: yields every worker registered so far, then each new one
    /// as it registers. It never ends while the registry is alive.
    pub fn subscribe(&self) -> WorkerFeed {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut state = self.lock();
        for worker in &state.workers {
            let _ = tx.send(worker.address.clone());
        }
        state.feeds.push(tx);

        WorkerFeed { rx }
    }

    pub fn workers(&self) -> Vec<WorkerInfo> {
        self.lock().workers.clone()
    }
}

/// Stream of worker addresses consumed by one scheduling call.
pub struct WorkerFeed {
    rx: UnboundedReceiver<String>,
}

impl WorkerFeed {
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
