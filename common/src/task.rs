use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => write!(f, "map"),
            Phase::Reduce => write!(f, "reduce"),
        }
    }
}

/// One unit of schedulable work. Sent as-is to `Worker.DoTask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub job_name: String,
    pub phase: Phase,
    pub task_index: usize,

    /// Input file of a map task; `None` for reduce tasks.
    pub input_file: Option<String>,

    /// nReduce for map tasks (partitions to write),
    /// nMap for reduce tasks (partitions to read).
    pub num_other_phase: usize,
}

impl TaskDescriptor {
    pub fn map(job_name: &str, task_index: usize, input_file: &str, n_reduce: usize) -> Self {
        Self {
            job_name: job_name.to_string(),
            phase: Phase::Map,
            task_index,
            input_file: Some(input_file.to_string()),
            num_other_phase: n_reduce,
        }
    }

    pub fn reduce(job_name: &str, task_index: usize, n_map: usize) -> Self {
        Self {
            job_name: job_name.to_string(),
            phase: Phase::Reduce,
            task_index,
            input_file: None,
            num_other_phase: n_map,
        }
    }
}
