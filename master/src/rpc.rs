// master/src/rpc.rs

use anyhow::Context;
use async_trait::async_trait;
use mr_common::{worker::rpc_path, DoTaskReply, TaskDescriptor, DO_TASK};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::warn;

/// How the scheduler reaches a worker.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Runs `task` on `worker`. `true` only when the worker acknowledged the
    /// task; `false` means the call left no effect and the task may go to
    /// another worker.
    async fn do_task(&self, worker: &str, task: &TaskDescriptor) -> bool;
}

/// JSON over HTTP: procedure `P` on worker `W` is `POST W/rpc/P`.
pub struct HttpWorkerClient {
    client: Client,
}

impl HttpWorkerClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building worker RPC client")?;
        Ok(Self { client })
    }

    /// Any transport error, timeout, non-2xx status or undecodable reply is
    /// `None`.
    pub async fn call<A, R>(&self, worker: &str, procedure: &str, args: &A) -> Option<R>
    where
        A: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", worker.trim_end_matches('/'), rpc_path(procedure));

        let resp = match self.client.post(&url).json(args).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(worker, procedure, "rpc error: {}", e);
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(worker, procedure, status = %resp.status(), "rpc rejected");
            return None;
        }

        match resp.json::<R>().await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(worker, procedure, "undecodable rpc reply: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn do_task(&self, worker: &str, task: &TaskDescriptor) -> bool {
        self.call::<_, DoTaskReply>(worker, DO_TASK, task)
            .await
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use mr_common::Phase;
    use tokio::net::TcpListener;

    async fn do_task_ok(Json(task): Json<TaskDescriptor>) -> Result<Json<DoTaskReply>, StatusCode> {
        if task.phase == Phase::Map {
            Ok(Json(DoTaskReply::default()))
        } else {
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }

    async fn spawn_fake_worker() -> String {
        let app = Router::new().route(&rpc_path(DO_TASK), post(do_task_ok));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn success_status_is_true_and_error_status_is_false() {
        let worker = spawn_fake_worker().await;
        let client = HttpWorkerClient::new(Duration::from_secs(5)).unwrap();

        let map = TaskDescriptor::map("j", 0, "/in/a.txt", 2);
        assert!(client.do_task(&worker, &map).await);

        let reduce = TaskDescriptor::reduce("j", 0, 1);
        assert!(!client.do_task(&worker, &reduce).await);
    }

    #[tokio::test]
    async fn unreachable_worker_is_false() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpWorkerClient::new(Duration::from_secs(2)).unwrap();
        let task = TaskDescriptor::map("j", 0, "/in/a.txt", 2);
        assert!(!client.do_task(&format!("http://{}", addr), &task).await);
    }

    #[tokio::test]
    async fn unknown_procedure_is_none() {
        let worker = spawn_fake_worker().await;
        let client = HttpWorkerClient::new(Duration::from_secs(5)).unwrap();

        let reply: Option<DoTaskReply> = client.call(&worker, "Worker.Shutdown", &()).await;
        assert!(reply.is_none());
    }
}
