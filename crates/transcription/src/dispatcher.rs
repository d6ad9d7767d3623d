use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::asr::{DiarizationBackend, DiarizedTranscription};
use crate::chunking::ChunkSpec;
use crate::error::JobError;

/// One chunk's transcription, paired with the spec that produced it.
#[derive(Debug, Clone)]
pub struct ChunkTranscription {
    pub spec: ChunkSpec,
    pub result: DiarizedTranscription,
}

/// Transcribes every chunk concurrently and returns the results in
/// chunk-index order regardless of completion order.
///
/// All tasks are submitted up front; the semaphore bounds how many are
/// in flight, it does not batch. The first failing chunk aborts the whole
/// dispatch with that chunk's error; sibling results are discarded.
pub async fn dispatch_chunks(
    backend: Arc<dyn DiarizationBackend>,
    chunks: Vec<(ChunkSpec, PathBuf)>,
    max_parallel: usize,
) -> Result<Vec<ChunkTranscription>, JobError> {
    let total = chunks.len();
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let mut tasks: JoinSet<(usize, Result<ChunkTranscription, JobError>)> = JoinSet::new();

    for (position, (spec, path)) in chunks.into_iter().enumerate() {
        let backend = Arc::clone(&backend);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        position,
                        Err(JobError::Service("dispatcher shut down".to_string())),
                    );
                }
            };

            debug!(
                chunk = spec.index,
                offset_secs = spec.start_offset_secs,
                "Transcribing chunk"
            );
            let outcome = backend
                .transcribe(&path)
                .await
                .map(|result| ChunkTranscription { spec, result });
            (position, outcome)
        });
    }

    let mut results: Vec<Option<ChunkTranscription>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        let (position, outcome) =
            joined.map_err(|e| JobError::Service(format!("chunk task failed: {e}")))?;
        match outcome {
            Ok(chunk) => {
                debug!(
                    chunk = chunk.spec.index,
                    segments = chunk.result.segments.len(),
                    "Chunk transcribed"
                );
                results[position] = Some(chunk);
            }
            Err(e) => {
                // Dropping the JoinSet aborts the still-running siblings.
                warn!(position, "Chunk transcription failed, aborting dispatch: {e}");
                return Err(e);
            }
        }
    }

    results
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| JobError::Service("chunk result missing after join".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::RawSegment;

    /// Backend whose per-chunk behavior is keyed by the file name.
    struct ScriptedBackend {
        /// File stems that fail instead of transcribing.
        failing: Vec<String>,
        /// Sleep per call, longest first, so completion order is reversed.
        staggered: bool,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                failing: Vec::new(),
                staggered: false,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DiarizationBackend for ScriptedBackend {
        async fn transcribe(&self, audio_path: &Path) -> Result<DiarizedTranscription, JobError> {
            let stem = audio_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if self.staggered {
                // chunk_000 sleeps longest so it finishes last.
                let rank: u64 = stem
                    .rsplit('_')
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(40_u64.saturating_sub(rank * 15))).await;
            } else {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&stem) {
                return Err(JobError::Service(format!("{stem} exploded")));
            }

            Ok(DiarizedTranscription {
                text: format!("text of {stem}"),
                duration: 1.0,
                segments: vec![RawSegment {
                    speaker: "Speaker 1".to_string(),
                    text: stem,
                    start: 0.0,
                    end: 1.0,
                }],
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn chunk_files(count: usize) -> Vec<(ChunkSpec, PathBuf)> {
        (0..count)
            .map(|i| {
                (
                    ChunkSpec {
                        index: i,
                        start_offset_secs: i as f64 * 1200.0,
                        duration_ms: 1_200_000,
                    },
                    PathBuf::from(format!("/tmp/chunk_{i}.mp3")),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn results_are_in_chunk_index_order_despite_completion_order() {
        let backend = Arc::new(ScriptedBackend {
            staggered: true,
            ..ScriptedBackend::new()
        });

        let results = dispatch_chunks(backend, chunk_files(3), 10).await.unwrap();

        let indices: Vec<usize> = results.iter().map(|c| c.spec.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(results[2].result.text, "text of chunk_2");
    }

    #[tokio::test]
    async fn one_failing_chunk_aborts_the_dispatch() {
        let backend = Arc::new(ScriptedBackend {
            failing: vec!["chunk_1".to_string()],
            ..ScriptedBackend::new()
        });

        let err = dispatch_chunks(backend, chunk_files(3), 10).await.unwrap_err();
        assert!(matches!(err, JobError::Service(_)));
        assert!(err.to_string().contains("chunk_1"));
    }

    #[tokio::test]
    async fn worker_pool_bound_is_respected() {
        let backend = Arc::new(ScriptedBackend::new());

        dispatch_chunks(Arc::clone(&backend) as Arc<dyn DiarizationBackend>, chunk_files(8), 2)
            .await
            .unwrap();

        assert!(backend.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn empty_chunk_list_yields_empty_results() {
        let backend = Arc::new(ScriptedBackend::new());
        let results = dispatch_chunks(backend as Arc<dyn DiarizationBackend>, Vec::new(), 4)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
