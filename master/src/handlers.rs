use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use glob::glob;
use mr_common::{
    naming::merge_prefix, JobInfo, JobRequest, JobResults, JobStatus, WorkerInfo,
    WorkerRegisterRequest, WorkerRegisterResponse,
};
use std::fs;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::driver::run_job;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/jobs", post(create_job))
        .route("/api/v1/jobs/:id", get(get_job))
        .route("/api/v1/jobs/:id/results", get(get_job_results))
        .route("/api/v1/workers", get(list_workers))
        .route("/api/v1/workers/register", post(register_worker))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- HTTP handlers ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Resolves the input files and starts the job in the background
async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<JobRequest>,
) -> Result<Json<JobInfo>, (StatusCode, String)> {
    if req.n_reduce < 1 {
        return Err((StatusCode::BAD_REQUEST, "n_reduce must be at least 1".to_string()));
    }

    let entries = glob(&req.input_glob).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid input_glob {:?}: {}", req.input_glob, e),
        )
    })?;

    let mut input_files: Vec<String> = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => input_files.push(path.to_string_lossy().to_string()),
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable input: {}", e),
        }
    }
    input_files.sort();

    let job = JobInfo {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        status: JobStatus::Accepted,
        phase: None,
        input_files,
        n_reduce: req.n_reduce,
        submitted_at: Utc::now(),
        started_at: None,
        finished_at: None,
        output_file: None,
        error: None,
    };

    info!(
        job = %job.id,
        name = %job.name,
        "job accepted: {} input files, {} reduce tasks",
        job.input_files.len(),
        job.n_reduce
    );

    state.insert_job(job.clone());
    tokio::spawn(run_job(state.clone(), job.id.clone()));

    Ok(Json(job))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobInfo>, StatusCode> {
    state.job(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

// Merged result plus whatever per-reduce outputs are still on disk
async fn get_job_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResults>, StatusCode> {
    let job = state.job(&id).ok_or(StatusCode::NOT_FOUND)?;

    let prefix = merge_prefix(&job.id);

    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(&state.config.data_dir) {
        for entry in entries.flatten() {
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(&prefix) {
                    files.push(name.to_string());
                }
            }
        }
    }
    files.sort();

    Ok(Json(JobResults {
        job_id: job.id,
        output_file: job.output_file,
        files,
    }))
}

async fn register_worker(
    State(state): State<AppState>,
    Json(req): Json<WorkerRegisterRequest>,
) -> Json<WorkerRegisterResponse> {
    let info = state.registry.register(&req.address, &req.hostname);
    info!(
        worker = %info.worker_id,
        address = %info.address,
        "worker registered from {}",
        info.hostname
    );
    Json(WorkerRegisterResponse {
        worker_id: info.worker_id,
    })
}

async fn list_workers(State(state): State<AppState>) -> Json<Vec<WorkerInfo>> {
    Json(state.registry.workers())
}
