pub mod openai;

pub use openai::OpenAiBackend;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::RawSegment;
use crate::error::JobError;

/// Raw result of one diarized transcription call.
///
/// Segment times are chunk-local; the merger shifts them into global time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiarizedTranscription {
    #[serde(default)]
    pub text: String,
    /// Duration in seconds of the submitted audio as measured by the service.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

/// Trait for pluggable diarizing transcription backends.
#[async_trait]
pub trait DiarizationBackend: Send + Sync + 'static {
    /// Transcribes one complete audio file (a whole recording or one chunk).
    ///
    /// A non-success response or transport error is fatal for this call;
    /// retrying, if desired, is the caller's concern.
    async fn transcribe(&self, audio_path: &Path) -> Result<DiarizedTranscription, JobError>;

    /// Human-readable backend name.
    fn name(&self) -> &str;
}
