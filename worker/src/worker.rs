use anyhow::{anyhow, Context, Result};
use mr_common::{app_by_name, WorkerRegisterRequest, WorkerRegisterResponse};
use reqwest::Client;
use std::{fs, time::Duration};
use tokio::{net::TcpListener, time::sleep};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::WorkerConfig;
use crate::server::{build_router, WorkerState};

const REGISTER_ATTEMPTS: u32 = 30;
const REGISTER_BACKOFF: Duration = Duration::from_secs(1);

/// Worker process:
/// - binds its RPC server first, so the master can call back right away;
/// - registers with the master, retrying while it is not up yet;
/// - serves `Worker.DoTask` until the process is stopped.
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_worker=debug,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    let app = app_by_name(&config.app).ok_or_else(|| anyhow!("unknown app {}", config.app))?;
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let state = WorkerState::new(app, config.data_dir.clone(), config.max_tasks);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(
        "worker listening on {} as {} (app={})",
        listener.local_addr()?,
        config.advertise_url,
        config.app
    );

    let server = tokio::spawn(async move { axum::serve(listener, build_router(state)).await });

    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let worker_id = register(&Client::new(), &config.master_url, &config.advertise_url, &hostname).await?;
    info!("worker registered with id = {}", worker_id);

    server.await.context("rpc server task")??;
    Ok(())
}

/// Announces `address` to the master, retrying up to `REGISTER_ATTEMPTS` times.
pub async fn register(
    client: &Client,
    master_url: &str,
    address: &str,
    hostname: &str,
) -> Result<String> {
    let url = format!("{}/api/v1/workers/register", master_url);
    let req = WorkerRegisterRequest {
        address: address.to_string(),
        hostname: hostname.to_string(),
    };

    let mut last_err = anyhow!("no registration attempt made");
    for attempt in 1..=REGISTER_ATTEMPTS {
        match try_register(client, &url, &req).await {
            Ok(worker_id) => return Ok(worker_id),
            Err(e) => {
                warn!("registration attempt {}/{} failed: {:#}", attempt, REGISTER_ATTEMPTS, e);
                last_err = e;
            }
        }
        if attempt < REGISTER_ATTEMPTS {
            sleep(REGISTER_BACKOFF).await;
        }
    }
    Err(last_err.context(format!("could not register with {}", master_url)))
}

async fn try_register(client: &Client, url: &str, req: &WorkerRegisterRequest) -> Result<String> {
    let resp = client
        .post(url)
        .json(req)
        .send()
        .await?
        .error_for_status()?;
    let WorkerRegisterResponse { worker_id } = resp.json().await?;
    Ok(worker_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    async fn fake_master(fail_first: usize) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/api/v1/workers/register",
            post(move |Json(req): Json<WorkerRegisterRequest>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < fail_first {
                        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(WorkerRegisterResponse {
                            worker_id: format!("id-for-{}", req.address),
                        }))
                    }
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        (format!("http://{}", addr), calls)
    }

    #[tokio::test]
    async fn registers_on_first_try() {
        let (url, calls) = fake_master(0).await;
        let id = register(&Client::new(), &url, "http://w:9090", "w").await.unwrap();
        assert_eq!(id, "id-for-http://w:9090");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_the_master_accepts() {
        let (url, calls) = fake_master(2).await;
        let id = register(&Client::new(), &url, "http://w:9090", "w").await.unwrap();
        assert_eq!(id, "id-for-http://w:9090");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
