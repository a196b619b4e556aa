use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::adapters::http::ApiState;
use crate::common::format_bytes;
use crate::domain::{AddSourceInput, StartOutcome, StopOutcome, SystemOverview};

const EMPTY_STORAGE: &str = "0 B";

#[derive(Debug, Serialize)]
pub(super) struct StatusResponse {
    recorder_running: bool,
    pid: Option<u32>,
    active_urls: usize,
    storage_usage: String,
}

impl StatusResponse {
    fn new(overview: SystemOverview, download_dir_exists: bool) -> Self {
        let storage_usage = if download_dir_exists {
            format_bytes(overview.storage_bytes)
        } else {
            EMPTY_STORAGE.to_string()
        };
        Self {
            recorder_running: overview.worker.running,
            pid: overview.worker.pid,
            active_urls: overview.active_urls,
            storage_usage,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddTaskRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    name: Option<String>,
    /// Accepted for compatibility; the platform is derived from the url.
    #[serde(default)]
    #[allow(dead_code)]
    platform: Option<String>,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Supervisor and file operations block; keep them off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|err| {
        error!(error = %err, "Blocking API task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })
}

pub(super) async fn status(State(state): State<Arc<ApiState>>) -> Response {
    let overview = Arc::clone(&state.overview);
    let download_dir = state.download_dir.clone();
    match run_blocking(move || (overview.execute(), download_dir.is_dir())).await {
        Ok((overview, dir_exists)) => Json(StatusResponse::new(overview, dir_exists)).into_response(),
        Err(resp) => resp,
    }
}

pub(super) async fn start_recorder(State(state): State<Arc<ApiState>>) -> Response {
    let supervisor = Arc::clone(&state.supervisor);
    let outcome = match run_blocking(move || supervisor.start()).await {
        Ok(outcome) => outcome,
        Err(resp) => return resp,
    };
    match outcome {
        Ok(StartOutcome::Started { pid }) => Json(MessageResponse {
            message: "Recorder started",
            pid: Some(pid),
        })
        .into_response(),
        Ok(StartOutcome::AlreadyRunning { pid }) => Json(MessageResponse {
            message: "Recorder is already running",
            pid: Some(pid),
        })
        .into_response(),
        Err(err) => {
            error!(operation = err.operation(), error = %err, "Failed to start recorder");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(super) async fn stop_recorder(State(state): State<Arc<ApiState>>) -> Response {
    let supervisor = Arc::clone(&state.supervisor);
    match run_blocking(move || supervisor.stop()).await {
        Ok(StopOutcome::NotRunning) => Json(MessageResponse {
            message: "Recorder is not running",
            pid: None,
        })
        .into_response(),
        Ok(StopOutcome::Stopped { pid, forced }) => {
            info!(pid, forced, "Recorder stopped via API");
            Json(MessageResponse {
                message: "Recorder stopped",
                pid: None,
            })
            .into_response()
        }
        Err(resp) => resp,
    }
}

pub(super) async fn list_tasks(State(state): State<Arc<ApiState>>) -> Response {
    let list_tasks = Arc::clone(&state.list_tasks);
    match run_blocking(move || list_tasks.execute()).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(resp) => resp,
    }
}

pub(super) async fn add_task(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AddTaskRequest>,
) -> Response {
    let add_source = Arc::clone(&state.add_source);
    let input = AddSourceInput {
        url: request.url,
        name: request.name,
    };
    match run_blocking(move || add_source.execute(input)).await {
        Ok(Ok(_)) => Json(MessageResponse {
            message: "URL added to config.",
            pid: None,
        })
        .into_response(),
        Ok(Err(err)) if err.is_invalid_input() => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Ok(Err(err)) => {
            warn!(error = %err, "Failed to add source");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(resp) => resp,
    }
}

pub(super) async fn list_recordings(State(state): State<Arc<ApiState>>) -> Response {
    let recordings = Arc::clone(&state.recordings);
    match run_blocking(move || recordings.execute()).await {
        Ok(recordings) => Json(recordings).into_response(),
        Err(resp) => resp,
    }
}
