// master/src/testing.rs
//
// In-process stand-ins for remote workers.

use async_trait::async_trait;
use mr_common::{execute_task, MapReduceApp, Phase, TaskDescriptor};
use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::rpc::WorkerClient;

struct Call {
    worker: String,
    phase: Phase,
    task_index: usize,
    ok: bool,
}

/// Succeeds on every call except to the workers marked as failing; records
/// every call.
#[derive(Default)]
pub struct ScriptedClient {
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, worker: &str) -> Self {
        self.failing.insert(worker.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Indexes of successful calls in `phase`, sorted, duplicates kept.
    pub fn successes(&self, phase: Phase) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.ok && c.phase == phase)
            .map(|c| c.task_index)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn calls_to(&self, worker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.worker == worker)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkerClient for ScriptedClient {
    async fn do_task(&self, worker: &str, task: &TaskDescriptor) -> bool {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let ok = !self.failing.contains(worker);
        self.calls.lock().unwrap().push(Call {
            worker: worker.to_string(),
            phase: task.phase,
            task_index: task.task_index,
            ok,
        });
        ok
    }
}

/// Runs tasks for real, in this process, against a shared data directory.
pub struct LocalWorkerClient {
    data_dir: PathBuf,
    app: Arc<dyn MapReduceApp>,
    failing: HashSet<String>,
}

impl LocalWorkerClient {
    pub fn new(data_dir: PathBuf, app: Arc<dyn MapReduceApp>) -> Self {
        Self {
            data_dir,
            app,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, worker: &str) -> Self {
        self.failing.insert(worker.to_string());
        self
    }
}

#[async_trait]
impl WorkerClient for LocalWorkerClient {
    async fn do_task(&self, worker: &str, task: &TaskDescriptor) -> bool {
        if self.failing.contains(worker) {
            return false;
        }
        let data_dir = self.data_dir.clone();
        let app = self.app.clone();
        let task = task.clone();
        tokio::task::spawn_blocking(move || execute_task(&data_dir, app.as_ref(), &task).is_ok())
            .await
            .unwrap_or(false)
    }
}

pub fn temp_dir(sub: &str) -> PathBuf {
    let base = std::env::temp_dir().join("mr_master_tests").join(sub);
    let _ = std::fs::remove_dir_all(&base);
    std::fs::create_dir_all(&base).unwrap();
    base
}
