// master/src/state.rs

use mr_common::{JobId, JobInfo};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::config::MasterConfig;
use crate::registry::WorkerRegistry;
use crate::rpc::WorkerClient;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<Mutex<HashMap<JobId, JobInfo>>>,
    pub registry: WorkerRegistry,
    pub client: Arc<dyn WorkerClient>,
    pub config: Arc<MasterConfig>,
}

impl AppState {
    pub fn new(config: MasterConfig, client: Arc<dyn WorkerClient>) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            registry: WorkerRegistry::new(),
            client,
            config: Arc::new(config),
        }
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, JobInfo>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_job(&self, job: JobInfo) {
        self.jobs().insert(job.id.clone(), job);
    }

    pub fn job(&self, id: &str) -> Option<JobInfo> {
        self.jobs().get(id).cloned()
    }

    pub fn update_job<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut JobInfo),
    {
        if let Some(job) = self.jobs().get_mut(id) {
            f(job);
        }
    }
}
