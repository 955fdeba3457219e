use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type WorkerId = String;

/// Procedure a worker exposes to run one task.
pub const DO_TASK: &str = "Worker.DoTask";

/// Path under which a worker serves `procedure`.
pub fn rpc_path(procedure: &str) -> String {
    format!("/rpc/{}", procedure)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRegisterRequest {
    /// Base URL the master uses to reach this worker, e.g. "http://worker-1:9090".
    pub address: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRegisterResponse {
    pub worker_id: WorkerId,
}

/// Reply of `Worker.DoTask`. Success is carried by the call outcome alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoTaskReply {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub worker_id: WorkerId,
    pub address: String,
    pub hostname: String,
    pub registered_at: DateTime<Utc>,
}
