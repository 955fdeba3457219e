use anyhow::{bail, Context};
use mr_common::app::APP_NAMES;
use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_MASTER_URL: &str = "http://localhost:8080";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9090";
pub const DEFAULT_DATA_DIR: &str = "/data/mr";
pub const DEFAULT_APP: &str = "wordcount";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub master_url: String,
    pub bind_addr: SocketAddr,
    /// Base URL the master calls back on.
    pub advertise_url: String,
    pub data_dir: PathBuf,
    pub app: String,
    /// Tasks to accept before answering every call with 503.
    pub max_tasks: Option<usize>,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = hostname::get()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::from_vars(|name| env::var(name).ok(), &host)
    }

    pub fn from_vars<F>(var: F, hostname: &str) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_bind = var("WORKER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_bind
            .parse()
            .with_context(|| format!("WORKER_BIND_ADDR must be host:port, got {:?}", raw_bind))?;

        let app = var("WORKER_APP").unwrap_or_else(|| DEFAULT_APP.to_string());
        if !APP_NAMES.contains(&app.as_str()) {
            bail!("unknown WORKER_APP {:?}, expected one of {:?}", app, APP_NAMES);
        }

        let max_tasks = match var("WORKER_MAX_TASKS") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .with_context(|| format!("WORKER_MAX_TASKS must be a number, got {:?}", raw))?,
            ),
            None => None,
        };

        let host = if hostname.is_empty() { "localhost" } else { hostname };

        Ok(Self {
            master_url: var("MASTER_URL")
                .unwrap_or_else(|| DEFAULT_MASTER_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            advertise_url: var("WORKER_ADVERTISE_URL")
                .unwrap_or_else(|| format!("http://{}:{}", host, bind_addr.port())),
            bind_addr,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            app,
            max_tasks,
        })
    }
}
