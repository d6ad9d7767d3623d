use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use scribe_services::tasks::{TaskSnapshot, TaskState};
use scribe_transcription::JobResult;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TaskCreated {
    pub task_id: String,
}

/// Accepts a multipart upload (field `audio`) and queues one
/// transcription task per request.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TaskCreated>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("audio") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("no file selected".to_string()))?;

        if !state.config.upload.is_allowed(&filename) {
            return Err(ApiError::BadRequest(format!(
                "invalid file format; supported formats: {}",
                state.config.upload.allowed_extensions.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("empty audio file".to_string()));
        }

        info!(%filename, bytes = bytes.len(), "Received transcription request");
        let task_id = state
            .tasks
            .submit(Arc::clone(&state.pipeline), bytes.to_vec(), filename);
        return Ok(Json(TaskCreated { task_id }));
    }

    Err(ApiError::BadRequest("no audio file provided".to_string()))
}

/// Poll response: either a processing marker or the finished JobResult.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TaskStatusResponse {
    Processing {
        status: &'static str,
        created_at: DateTime<Utc>,
    },
    Done(JobResult),
}

pub async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    match state.tasks.poll(&task_id) {
        None => Err(ApiError::NotFound(format!("unknown task: {task_id}"))),
        Some(TaskSnapshot {
            state: TaskState::Processing,
            created_at,
        }) => Ok(Json(TaskStatusResponse::Processing {
            status: "processing",
            created_at,
        })),
        Some(TaskSnapshot {
            state: TaskState::Done(result),
            ..
        }) => Ok(Json(TaskStatusResponse::Done(result))),
    }
}
