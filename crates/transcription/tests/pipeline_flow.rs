//! End-to-end pipeline runs against a scripted media tool and backend:
//! no ffmpeg, no network.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use scribe_transcription::asr::{DiarizationBackend, DiarizedTranscription};
use scribe_transcription::error::JobError;
use scribe_transcription::media::MediaTool;
use scribe_transcription::{JobResult, RawSegment, TranscriptionConfig, TranscriptionPipeline};

/// Media tool that fabricates files instead of shelling out.
struct StubMedia {
    duration_secs: f64,
    normalized_bytes: u64,
    /// Bytes written per chunk index; unlisted chunks get a sane size.
    chunk_bytes: HashMap<usize, u64>,
}

impl StubMedia {
    fn new(duration_secs: f64, normalized_bytes: u64) -> Self {
        Self {
            duration_secs,
            normalized_bytes,
            chunk_bytes: HashMap::new(),
        }
    }
}

#[async_trait]
impl MediaTool for StubMedia {
    async fn probe_duration(&self, _input: &Path) -> Result<f64, JobError> {
        Ok(self.duration_secs)
    }

    async fn normalize(&self, _input: &Path, output: &Path) -> Result<(), JobError> {
        tokio::fs::write(output, vec![0u8; self.normalized_bytes as usize]).await?;
        Ok(())
    }

    async fn extract_range(
        &self,
        _input: &Path,
        output: &Path,
        _start_secs: f64,
        _duration_secs: f64,
    ) -> Result<(), JobError> {
        let index = chunk_index(output);
        let size = self.chunk_bytes.get(&index).copied().unwrap_or(4096);
        tokio::fs::write(output, vec![0u8; size as usize]).await?;
        Ok(())
    }
}

fn chunk_index(path: &Path) -> usize {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('_').next())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(usize::MAX)
}

/// Backend scripted per file stem ("normalized", "chunk_000", ...).
struct StubBackend {
    responses: HashMap<String, DiarizedTranscription>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl StubBackend {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn respond(mut self, stem: &str, text: &str, segments: Vec<RawSegment>) -> Self {
        self.responses.insert(
            stem.to_string(),
            DiarizedTranscription {
                text: text.to_string(),
                duration: 0.0,
                segments,
            },
        );
        self
    }

    fn fail_on(mut self, stem: &str) -> Self {
        self.failing.insert(stem.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiarizationBackend for StubBackend {
    async fn transcribe(&self, audio_path: &Path) -> Result<DiarizedTranscription, JobError> {
        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push(stem.clone());

        if self.failing.contains(&stem) {
            return Err(JobError::Service(format!("{stem} rejected by service")));
        }
        Ok(self.responses.get(&stem).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn segment(speaker: &str, text: &str, start: f64, end: f64) -> RawSegment {
    RawSegment {
        speaker: speaker.to_string(),
        text: text.to_string(),
        start,
        end,
    }
}

fn config() -> TranscriptionConfig {
    TranscriptionConfig {
        chunk_duration_secs: 1200,
        max_chunk_bytes: 24 * 1024 * 1024,
        max_parallel_chunks: 4,
        ..TranscriptionConfig::default()
    }
}

#[tokio::test]
async fn short_file_is_transcribed_as_one_unit() {
    let media = Arc::new(StubMedia::new(300.0, 2 * 1024 * 1024));
    let backend = Arc::new(
        StubBackend::new().respond(
            "normalized",
            "Hello world.",
            vec![
                segment("Speaker 1", "Hello", 0.0, 1.0),
                segment("Speaker 1", "world", 1.0, 2.0),
            ],
        ),
    );

    let pipeline = TranscriptionPipeline::new(
        config(),
        media,
        Arc::clone(&backend) as Arc<dyn DiarizationBackend>,
    );
    let result = pipeline.run(b"fake audio", "meeting.m4a").await;

    let JobResult::Completed {
        text,
        duration,
        segments,
    } = result
    else {
        panic!("expected a completed job");
    };

    assert_eq!(text, "Hello world.");
    assert_eq!(duration, 300.0);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].id, "seg_000");
    assert_eq!(segments[0].text, "Hello world");
    // Single-file path: timestamps pass through unchanged.
    assert_eq!(segments[0].start, 0.0);
    assert_eq!(segments[0].end, 2.0);

    assert_eq!(backend.calls(), vec!["normalized".to_string()]);
}

#[tokio::test]
async fn long_file_is_chunked_and_merged_in_global_time() {
    // 50 minutes with 20-minute chunks: three service calls.
    let media = Arc::new(StubMedia::new(3000.0, 30 * 1024 * 1024));
    let backend = Arc::new(
        StubBackend::new()
            .respond(
                "chunk_000",
                "First part.",
                vec![segment("Speaker 1", "First part.", 0.0, 1190.0)],
            )
            .respond(
                "chunk_001",
                "Second part.",
                vec![segment("Speaker 1", "Second part.", 0.0, 1180.0)],
            )
            .respond(
                "chunk_002",
                "Third part.",
                vec![segment("Speaker 2", "Third part.", 2.0, 590.0)],
            ),
    );

    let pipeline = TranscriptionPipeline::new(
        config(),
        media,
        Arc::clone(&backend) as Arc<dyn DiarizationBackend>,
    );
    let result = pipeline.run(b"fake audio", "allhands.mp3").await;

    let JobResult::Completed {
        text,
        duration,
        segments,
    } = result
    else {
        panic!("expected a completed job");
    };

    assert_eq!(text, "First part. Second part. Third part.");
    assert_eq!(duration, 3000.0);

    // Same label in chunks 0 and 1 merges across the boundary; chunk 2's
    // segment lands at its global offset.
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].speaker, "Speaker 1");
    assert_eq!(segments[0].start, 0.0);
    assert_eq!(segments[0].end, 2380.0);
    assert_eq!(segments[1].speaker, "Speaker 2");
    assert_eq!(segments[1].start, 2402.0);
    assert_eq!(segments[1].end, 2990.0);

    let mut calls = backend.calls();
    calls.sort();
    assert_eq!(calls, vec!["chunk_000", "chunk_001", "chunk_002"]);
}

#[tokio::test]
async fn one_failing_chunk_fails_the_whole_job() {
    let media = Arc::new(StubMedia::new(3000.0, 30 * 1024 * 1024));
    let backend = Arc::new(
        StubBackend::new()
            .respond("chunk_000", "ok", vec![segment("A", "ok", 0.0, 1.0)])
            .fail_on("chunk_001")
            .respond("chunk_002", "ok", vec![segment("A", "ok", 0.0, 1.0)]),
    );

    let pipeline = TranscriptionPipeline::new(config(), media, backend);
    let result = pipeline.run(b"fake audio", "broken.wav").await;

    let JobResult::Failed { error } = result else {
        panic!("expected a failed job");
    };
    assert!(error.contains("transcription service error"));
    assert!(error.contains("chunk_001"));
}

#[tokio::test]
async fn degenerate_chunks_are_never_sent_to_the_service() {
    let mut media = StubMedia::new(3000.0, 30 * 1024 * 1024);
    // Chunk 1's encode comes out near-empty.
    media.chunk_bytes.insert(1, 16);

    let backend = Arc::new(
        StubBackend::new()
            .respond("chunk_000", "Start.", vec![segment("A", "Start.", 0.0, 1.0)])
            .respond("chunk_002", "End.", vec![segment("A", "End.", 0.0, 1.0)]),
    );

    let pipeline = TranscriptionPipeline::new(
        config(),
        Arc::new(media),
        Arc::clone(&backend) as Arc<dyn DiarizationBackend>,
    );
    let result = pipeline.run(b"fake audio", "gappy.mp3").await;

    let JobResult::Completed { text, segments, .. } = result else {
        panic!("expected a completed job");
    };

    assert_eq!(text, "Start. End.");
    assert_eq!(segments.len(), 1);

    let mut calls = backend.calls();
    calls.sort();
    assert_eq!(calls, vec!["chunk_000", "chunk_002"]);
}

#[test]
fn job_results_serialize_with_a_status_tag() {
    let completed = JobResult::Completed {
        text: "hi".to_string(),
        duration: 1.5,
        segments: vec![],
    };
    let json = serde_json::to_value(&completed).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["duration"], 1.5);

    let failed = JobResult::Failed {
        error: "boom".to_string(),
    };
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "boom");
}

#[tokio::test]
async fn job_with_no_usable_text_fails() {
    let media = Arc::new(StubMedia::new(300.0, 1024 * 1024));
    let backend = Arc::new(StubBackend::new().respond("normalized", "", vec![]));

    let pipeline = TranscriptionPipeline::new(config(), media, backend);
    let result = pipeline.run(b"fake audio", "silence.mp3").await;

    assert!(matches!(result, JobResult::Failed { .. }));
}
