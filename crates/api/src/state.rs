use std::sync::Arc;

use scribe_config::AppConfig;
use scribe_services::{EmailService, TaskRegistry};
use scribe_transcription::TranscriptionPipeline;

/// Shared application state, constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<TranscriptionPipeline>,
    pub tasks: Arc<TaskRegistry>,
    /// None when no sender address is configured.
    pub email: Option<Arc<EmailService>>,
}
