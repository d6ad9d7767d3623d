use serde::{Deserialize, Serialize};

use crate::config::TranscriptionConfig;

/// One planned chunk of an oversized recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSpec {
    /// Ordinal position, contiguous from 0.
    pub index: usize,
    /// Seconds from the start of the recording where this chunk begins.
    pub start_offset_secs: f64,
    /// Chunk length in milliseconds; only the last chunk may be shorter.
    pub duration_ms: u64,
}

impl ChunkSpec {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Outcome of chunk planning.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkPlan {
    /// The file fits the service limits; transcribe it as one unit.
    Single,
    /// The file must be split into these chunks.
    Split(Vec<ChunkSpec>),
}

/// Decides whether a normalized file must be split and computes the chunk
/// boundaries.
///
/// Splitting is duration-driven: `ceil(total / chunk_duration)` chunks at
/// fixed offsets, the last one covering the remainder. A file over the
/// byte ceiling is split even when its duration alone would not require
/// it; when the size trigger demands more chunks than the duration does,
/// the effective chunk duration shrinks so every chunk stays under the
/// ceiling. Whichever constraint is stricter wins.
pub fn plan_chunks(
    total_duration_secs: f64,
    encoded_size_bytes: u64,
    config: &TranscriptionConfig,
) -> ChunkPlan {
    let chunk_ms = config.chunk_duration_secs.saturating_mul(1000).max(1);
    let total_ms = (total_duration_secs * 1000.0).round() as u64;
    if total_ms == 0 {
        return ChunkPlan::Single;
    }

    let by_duration = total_ms.div_ceil(chunk_ms);
    let by_size = encoded_size_bytes.div_ceil(config.max_chunk_bytes.max(1));
    let num_chunks = by_duration.max(by_size);
    if num_chunks <= 1 {
        return ChunkPlan::Single;
    }

    let effective_chunk_ms = if by_size > by_duration {
        total_ms.div_ceil(num_chunks)
    } else {
        chunk_ms
    };

    let mut chunks = Vec::with_capacity(num_chunks as usize);
    let mut remaining = total_ms;
    for index in 0..num_chunks as usize {
        let duration_ms = remaining.min(effective_chunk_ms);
        if duration_ms == 0 {
            break;
        }
        chunks.push(ChunkSpec {
            index,
            start_offset_secs: (index as u64 * effective_chunk_ms) as f64 / 1000.0,
            duration_ms,
        });
        remaining -= duration_ms;
    }

    ChunkPlan::Split(chunks)
}
