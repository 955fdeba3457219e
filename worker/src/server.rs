use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use mr_common::{
    execute_task, worker::rpc_path, DoTaskReply, MapReduceApp, TaskDescriptor, DO_TASK,
};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::sync::Semaphore;
use tracing::{info, warn};

#[derive(Clone)]
pub struct WorkerState {
    app: Arc<dyn MapReduceApp>,
    data_dir: PathBuf,
    // one task at a time
    slot: Arc<Semaphore>,
    accepted: Arc<AtomicUsize>,
    max_tasks: Option<usize>,
}

impl WorkerState {
    pub fn new(app: Arc<dyn MapReduceApp>, data_dir: PathBuf, max_tasks: Option<usize>) -> Self {
        Self {
            app,
            data_dir,
            slot: Arc::new(Semaphore::new(1)),
            accepted: Arc::new(AtomicUsize::new(0)),
            max_tasks,
        }
    }
}

pub fn build_router(state: WorkerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&rpc_path(DO_TASK), post(do_task))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn do_task(
    State(state): State<WorkerState>,
    Json(task): Json<TaskDescriptor>,
) -> Result<Json<DoTaskReply>, (StatusCode, String)> {
    let seen = state.accepted.fetch_add(1, Ordering::SeqCst);
    if let Some(max) = state.max_tasks {
        if seen >= max {
            warn!(
                phase = %task.phase,
                task = task.task_index,
                "refusing task, limit of {} tasks reached",
                max
            );
            return Err((StatusCode::SERVICE_UNAVAILABLE, "worker is shutting down".to_string()));
        }
    }

    let _permit = state
        .slot
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| (StatusCode::SERVICE_UNAVAILABLE, "worker is closed".to_string()))?;

    info!(
        job = %task.job_name,
        phase = %task.phase,
        task = task.task_index,
        "running task"
    );

    let app = state.app.clone();
    let data_dir = state.data_dir.clone();
    let job = task.job_name.clone();
    let phase = task.phase;
    let index = task.task_index;
    let outcome = tokio::task::spawn_blocking(move || execute_task(&data_dir, app.as_ref(), &task)).await;

    match outcome {
        Ok(Ok(())) => {
            info!(job = %job, %phase, task = index, "task done");
            Ok(Json(DoTaskReply::default()))
        }
        Ok(Err(e)) => {
            warn!(job = %job, %phase, task = index, "task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            warn!(job = %job, %phase, task = index, "task panicked: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("task panicked: {}", e)))
        }
    }
}
