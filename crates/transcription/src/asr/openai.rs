use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::{DiarizationBackend, DiarizedTranscription};
use crate::config::TranscriptionConfig;
use crate::error::JobError;

/// OpenAI-compatible diarizing transcription backend.
///
/// One multipart POST per audio file against `/audio/transcriptions`,
/// requesting the `diarized_json` response format so speaker labels and
/// timestamps come back from a single call. Speaker numbering is
/// per-call: "Speaker 1" in one chunk has no relation to "Speaker 1"
/// in another.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiBackend {
    /// Fails with `JobError::Configuration` when no API key is available,
    /// before any work begins.
    pub fn new(config: &TranscriptionConfig) -> Result<Self, JobError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                JobError::Configuration("transcription API key is not set".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| JobError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/audio/transcriptions",
                config.api_base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl DiarizationBackend for OpenAiBackend {
    async fn transcribe(&self, audio_path: &Path) -> Result<DiarizedTranscription, JobError> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        debug!(file = %file_name, bytes = bytes.len(), "Submitting audio for transcription");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| JobError::Service(format!("invalid upload part: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "diarized_json");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| JobError::Service(format!("transcription request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobError::Service(format!(
                "transcription API error ({status}): {body}"
            )));
        }

        response
            .json::<DiarizedTranscription>()
            .await
            .map_err(|e| JobError::Service(format!("malformed transcription response: {e}")))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
