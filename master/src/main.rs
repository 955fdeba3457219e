mod config;
mod driver;
mod handlers;
mod registry;
mod rpc;
mod scheduler;
mod state;
mod task_queue;
#[cfg(test)]
mod testing;

use anyhow::Context;
use std::{fs, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::MasterConfig;
use crate::rpc::HttpWorkerClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_master=debug,axum=info")),
        )
        .init();

    let config = MasterConfig::from_env()?;
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let client = HttpWorkerClient::new(config.rpc_timeout)?;
    let bind_addr = config.bind_addr.clone();
    let data_dir = config.data_dir.clone();
    let state = AppState::new(config, Arc::new(client));

    // router HTTP
    let app = handlers::build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!(
        "master listening on {} (data dir {})",
        listener.local_addr()?,
        data_dir.display()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
