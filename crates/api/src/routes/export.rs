use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use scribe_services::export::{self, TranscriptSegment};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
    #[serde(default = "default_title")]
    pub title: String,
}

pub(crate) fn default_title() -> String {
    "Meeting Transcript".to_string()
}

/// Renders the posted segments as a downloadable document in the format
/// named by the path: `text`, `markdown`, `html` or `pdf`.
pub async fn export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let title = request.title;
    let (content_type, extension, body) = match format.as_str() {
        "text" => (
            "text/plain; charset=utf-8",
            "txt",
            export::render_text(&request.segments).into_bytes(),
        ),
        "markdown" => (
            "text/markdown; charset=utf-8",
            "md",
            export::render_markdown(&request.segments, &title).into_bytes(),
        ),
        "html" => (
            "text/html; charset=utf-8",
            "html",
            export::render_html(&request.segments, &title).into_bytes(),
        ),
        "pdf" => (
            "application/pdf",
            "pdf",
            export::render_pdf(&request.segments, &title, &state.config.export)?,
        ),
        other => {
            return Err(ApiError::NotFound(format!("unknown export format: {other}")));
        }
    };

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{title}.{extension}\""),
        ),
    ];
    Ok((headers, body).into_response())
}
