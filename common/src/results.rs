use serde::{Deserialize, Serialize};

use crate::job::JobId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResults {
    pub job_id: JobId,
    /// Merged output of the whole job, once it succeeded
    pub output_file: Option<String>,
    /// Per-reduce-task output files still present in the data directory
    pub files: Vec<String>,
}
