// master/src/config.rs

use anyhow::Context;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATA_DIR: &str = "/data/mr";
/// Upper bound for one `Worker.DoTask` call; past it the task is requeued.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub bind_addr: String,
    /// Directory shared with the workers; partitions and outputs live here.
    pub data_dir: PathBuf,
    pub rpc_timeout: Duration,
    /// Leave partition files and per-reduce outputs after a job succeeds.
    pub keep_intermediate: bool,
}

impl MasterConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_timeout_secs = match var("RPC_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("RPC_TIMEOUT_SECS must be a number of seconds, got {:?}", raw))?,
            None => DEFAULT_RPC_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr: var("MASTER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            keep_intermediate: var("KEEP_INTERMEDIATE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}
