pub mod ffmpeg;

pub use ffmpeg::FfmpegTool;

use std::path::Path;

use async_trait::async_trait;

use crate::error::JobError;

/// External media-inspection and re-encoding capability.
///
/// Implementations shell out to a command-style tool; a non-zero exit or
/// decode error is fatal for the job and never retried.
#[async_trait]
pub trait MediaTool: Send + Sync + 'static {
    /// Total duration of a media file in seconds.
    async fn probe_duration(&self, input: &Path) -> Result<f64, JobError>;

    /// Re-encodes arbitrary container/codec into the canonical format sent
    /// to the transcription service: mono, 16 kHz, low bitrate.
    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), JobError>;

    /// Extracts `[start, start+duration)` of the source into one chunk
    /// file, normalized the same way.
    async fn extract_range(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<(), JobError>;
}
