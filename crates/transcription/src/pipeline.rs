use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::asr::DiarizationBackend;
use crate::chunking::{self, ChunkPlan, ChunkSpec};
use crate::config::TranscriptionConfig;
use crate::dispatcher::{self, ChunkTranscription};
use crate::error::JobError;
use crate::media::MediaTool;
use crate::merge;
use crate::JobResult;

/// Chunk files below this size are encoding artifacts (a boundary landing
/// on trailing silence), not audio worth a service call.
const MIN_CHUNK_BYTES: u64 = 1024;

/// One pipeline run per submitted file:
/// probe → transcode → (split) → transcribe → merge.
///
/// Constructed once with its configuration and shared via `Arc`; every
/// `run` call is an independent job with its own scoped working directory.
/// No hidden process-wide state.
pub struct TranscriptionPipeline {
    config: TranscriptionConfig,
    media: Arc<dyn MediaTool>,
    backend: Arc<dyn DiarizationBackend>,
}

impl TranscriptionPipeline {
    pub fn new(
        config: TranscriptionConfig,
        media: Arc<dyn MediaTool>,
        backend: Arc<dyn DiarizationBackend>,
    ) -> Self {
        Self {
            config,
            media,
            backend,
        }
    }

    /// Runs one job to completion. Every fatal error becomes
    /// `JobResult::Failed`, and the job-scoped temp directory is removed
    /// on all exit paths.
    pub async fn run(&self, audio: &[u8], filename: &str) -> JobResult {
        info!(
            %filename,
            bytes = audio.len(),
            backend = self.backend.name(),
            "Transcription job started"
        );

        match self.run_inner(audio, filename).await {
            Ok(result) => {
                if let JobResult::Completed { ref segments, duration, .. } = result {
                    info!(
                        segments = segments.len(),
                        duration_secs = duration,
                        "Transcription job completed"
                    );
                }
                result
            }
            Err(e) => {
                warn!(%filename, "Transcription job failed: {e}");
                JobResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn run_inner(&self, audio: &[u8], filename: &str) -> Result<JobResult, JobError> {
        // Working files live here; the directory is deleted when this
        // guard drops, on every exit path.
        let workdir = tempfile::tempdir()?;

        let source = workdir.path().join(source_name(filename));
        tokio::fs::write(&source, audio).await?;

        // Probe before transcoding: unreadable input fails here, with a
        // media error instead of a confusing encode error.
        let source_duration = self.media.probe_duration(&source).await?;
        info!(duration_secs = source_duration, "Probed source duration");

        // Normalize before any duration/size check: the service limits
        // apply to the canonical encoding, not to the upload.
        let normalized = workdir.path().join("normalized.mp3");
        self.media.normalize(&source, &normalized).await?;

        let duration = self.media.probe_duration(&normalized).await?;
        let encoded_size = tokio::fs::metadata(&normalized).await?.len();

        let (chunks, total_duration) =
            match chunking::plan_chunks(duration, encoded_size, &self.config) {
                ChunkPlan::Single => {
                    let single = self.transcribe_single(&normalized).await?;
                    let reported = single[0].result.duration;
                    let total = if reported > 0.0 { reported } else { duration };
                    (single, total)
                }
                ChunkPlan::Split(specs) => {
                    let results = self
                        .transcribe_chunked(workdir.path(), &normalized, specs)
                        .await?;
                    (results, duration)
                }
            };

        let text = merge::join_chunk_texts(&chunks);
        if text.is_empty() {
            return Err(JobError::Service(
                "transcription produced no text".to_string(),
            ));
        }

        let globalized = merge::globalize_segments(&chunks);
        let segments = merge::collapse_segments(&globalized);

        Ok(JobResult::Completed {
            text,
            duration: total_duration,
            segments,
        })
    }

    /// Single-file path: one service call, timestamps pass through.
    async fn transcribe_single(
        &self,
        normalized: &Path,
    ) -> Result<Vec<ChunkTranscription>, JobError> {
        let result = self.backend.transcribe(normalized).await?;
        let spec = ChunkSpec {
            index: 0,
            start_offset_secs: 0.0,
            duration_ms: ((result.duration * 1000.0) as u64).max(1),
        };
        Ok(vec![ChunkTranscription { spec, result }])
    }

    /// Chunked path: extract every chunk, drop degenerate ones, then
    /// transcribe the rest in parallel.
    async fn transcribe_chunked(
        &self,
        workdir: &Path,
        normalized: &Path,
        specs: Vec<ChunkSpec>,
    ) -> Result<Vec<ChunkTranscription>, JobError> {
        info!(chunks = specs.len(), "Splitting for parallel transcription");

        let mut chunk_files: Vec<(ChunkSpec, PathBuf)> = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = workdir.join(format!("chunk_{:03}.mp3", spec.index));
            self.media
                .extract_range(normalized, &path, spec.start_offset_secs, spec.duration_secs())
                .await?;

            let size = tokio::fs::metadata(&path).await?.len();
            if size < MIN_CHUNK_BYTES {
                warn!(chunk = spec.index, bytes = size, "Dropping degenerate chunk");
                continue;
            }
            chunk_files.push((spec, path));
        }

        let results = dispatcher::dispatch_chunks(
            Arc::clone(&self.backend),
            chunk_files,
            self.config.max_parallel_chunks,
        )
        .await?;

        for chunk in &results {
            if chunk.result.segments.is_empty() {
                // Not an error: silence-only chunks happen on long
                // recordings, and the merger just skips them.
                warn!(chunk = chunk.spec.index, "Chunk produced no segments");
            }
        }

        Ok(results)
    }
}

fn source_name(filename: &str) -> String {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("source.{ext}"),
        _ => "source".to_string(),
    }
}
