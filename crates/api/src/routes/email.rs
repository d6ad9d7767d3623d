use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use scribe_services::export::{self, TranscriptSegment};

use crate::error::ApiError;
use crate::routes::export::default_title;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub include_pdf: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
}

/// Emails the transcript as text + HTML, with a PDF attachment unless the
/// caller opts out.
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let email = state
        .email
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("email sending is not configured".to_string()))?;

    if request.email.is_empty() {
        return Err(ApiError::BadRequest("email address is required".to_string()));
    }

    let body_text = export::render_text(&request.segments);
    let body_html = export::render_html(&request.segments, &request.title);
    let pdf = if request.include_pdf {
        Some(export::render_pdf(
            &request.segments,
            &request.title,
            &state.config.export,
        )?)
    } else {
        None
    };

    email
        .send_transcript(&request.email, &request.title, body_text, body_html, pdf)
        .await?;

    info!(to = %request.email, title = %request.title, "Transcript emailed");
    Ok(Json(SendEmailResponse {
        success: true,
        message: format!("Transcript sent to {}", request.email),
    }))
}
