use serde::{Deserialize, Serialize};

/// Configuration for the transcription pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// API key for the transcription service. None = not configured.
    pub api_key: Option<String>,
    /// Base URL of the transcription service.
    pub api_base_url: String,
    /// Diarizing transcription model to request.
    pub model: String,
    /// Per-call request timeout in seconds. Large-audio transcription is
    /// slow, so this is generous.
    pub request_timeout_secs: u64,
    /// Chunk duration in seconds when a recording must be split.
    pub chunk_duration_secs: u64,
    /// Byte ceiling for a single upload (service limit minus a safety margin).
    pub max_chunk_bytes: u64,
    /// Number of chunks transcribed simultaneously per job.
    pub max_parallel_chunks: usize,
    /// ffmpeg binary name or path.
    pub ffmpeg_path: String,
    /// ffprobe binary name or path.
    pub ffprobe_path: String,
    /// Target bitrate (kbps) of the canonical encoding.
    pub audio_bitrate_kbps: u32,
    /// Target sample rate (Hz) of the canonical encoding.
    pub sample_rate: u32,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-transcribe-diarize".to_string(),
            request_timeout_secs: 600,
            chunk_duration_secs: 1200,
            max_chunk_bytes: 24 * 1024 * 1024,
            max_parallel_chunks: 10,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            audio_bitrate_kbps: 64,
            sample_rate: 16000,
        }
    }
}
