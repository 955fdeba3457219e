//! Failures of the task executors.
//!
//! Every variant means the task did not complete and must not be counted;
//! whoever runs the executor decides what to do with it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("cannot read map input {path}: {source}")]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("cannot open partition {path}: {source}")]
    OpenPartition { path: PathBuf, source: io::Error },

    #[error("cannot read partition {path}: {source}")]
    ReadPartition { path: PathBuf, source: io::Error },

    #[error("cannot open reduce output {path}: {source}")]
    OpenResult { path: PathBuf, source: io::Error },

    #[error("cannot create output {path}: {source}")]
    CreateOutput { path: PathBuf, source: io::Error },

    #[error("cannot write output {path}: {source}")]
    WriteOutput { path: PathBuf, source: io::Error },

    #[error("invalid task: {0}")]
    InvalidTask(String),
}

impl ExecError {
    pub fn invalid_task(reason: impl Into<String>) -> Self {
        Self::InvalidTask(reason.into())
    }
}
