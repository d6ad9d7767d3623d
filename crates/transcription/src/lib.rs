pub mod asr;
pub mod chunking;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod media;
pub mod merge;
pub mod pipeline;

pub use asr::{DiarizationBackend, DiarizedTranscription};
pub use chunking::{ChunkPlan, ChunkSpec};
pub use config::TranscriptionConfig;
pub use error::JobError;
pub use pipeline::TranscriptionPipeline;

use serde::{Deserialize, Serialize};

/// A speaker-labeled span as returned by the transcription service.
///
/// Times are relative to the start of whatever audio blob was actually
/// sent (chunk-local, not global).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default = "default_speaker")]
    pub speaker: String,
    #[serde(default)]
    pub text: String,
    /// Seconds since the start of the submitted audio.
    #[serde(default)]
    pub start: f64,
    /// Seconds since the start of the submitted audio.
    #[serde(default)]
    pub end: f64,
}

fn default_speaker() -> String {
    "Speaker".to_string()
}

/// A collapsed span of transcript attributed to one speaker, in global time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSegment {
    /// Stable sequential ID: `seg_000`, `seg_001`, ...
    pub id: String,
    pub speaker: String,
    pub text: String,
    /// Seconds since the start of the full recording.
    pub start: f64,
    /// Seconds since the start of the full recording.
    pub end: f64,
}

/// Final outcome of one transcription job. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResult {
    Completed {
        /// Full transcript, chunk texts joined with spaces in chunk order.
        text: String,
        /// Total recording duration in seconds.
        duration: f64,
        segments: Vec<MergedSegment>,
    },
    Failed {
        error: String,
    },
}
