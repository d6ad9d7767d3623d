use thiserror::Error;

/// Fatal pipeline errors. Each one terminates the job; no stage retries.
#[derive(Debug, Error)]
pub enum JobError {
    /// ffmpeg/ffprobe failed: bad input file, unsupported codec, missing tool.
    #[error("media tool error: {0}")]
    MediaTool(String),

    /// The transcription service returned non-success or was unreachable
    /// within the timeout.
    #[error("transcription service error: {0}")]
    Service(String),

    /// A required credential or setting is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
