use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Phase;

pub type JobId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub name: String,

    /// Pattern for the map inputs, e.g. "/data/input/*.txt". One map task per file.
    pub input_glob: String,

    /// Number of reduce tasks (and partitions per map task).
    pub n_reduce: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Accepted,
    Running,
    Failed,
    Succeeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,

    /// Phase currently being scheduled, if any.
    pub phase: Option<Phase>,

    pub input_files: Vec<String>,
    pub n_reduce: u32,

    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Merged result, set once the job succeeded.
    pub output_file: Option<String>,
    pub error: Option<String>,
}

impl JobInfo {
    pub fn n_map(&self) -> usize {
        self.input_files.len()
    }
}
