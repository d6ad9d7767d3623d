use crate::dispatcher::ChunkTranscription;
use crate::{MergedSegment, RawSegment};

/// Shifts every chunk-local segment into global time and flattens the
/// per-chunk results into one list sorted by start time.
///
/// Chunk results arrive in index order already, but the sort is never
/// skipped: the ordering invariant belongs to this function, not to the
/// caller.
pub fn globalize_segments(chunks: &[ChunkTranscription]) -> Vec<RawSegment> {
    let mut segments: Vec<RawSegment> = chunks
        .iter()
        .flat_map(|chunk| {
            let offset = chunk.spec.start_offset_secs;
            chunk.result.segments.iter().map(move |segment| RawSegment {
                speaker: segment.speaker.clone(),
                text: segment.text.clone(),
                start: segment.start + offset,
                end: segment.end + offset,
            })
        })
        .collect();

    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    segments
}

/// Collapses consecutive same-speaker segments into merged segments with
/// stable sequential IDs.
///
/// Input must already be in global time order. Empty-text segments never
/// open or extend anything. Labels are compared by string equality only:
/// the service numbers speakers independently per call, so no cross-chunk
/// voice matching is attempted.
pub fn collapse_segments(segments: &[RawSegment]) -> Vec<MergedSegment> {
    let mut merged: Vec<MergedSegment> = Vec::new();
    let mut open: Option<MergedSegment> = None;

    for segment in segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        match &mut open {
            Some(current) if current.speaker == segment.speaker => {
                current.text.push(' ');
                current.text.push_str(text);
                current.end = segment.end;
            }
            current => {
                if let Some(done) = current.take() {
                    merged.push(done);
                }
                *current = Some(MergedSegment {
                    id: String::new(),
                    speaker: segment.speaker.clone(),
                    text: text.to_string(),
                    start: segment.start,
                    end: segment.end,
                });
            }
        }
    }

    if let Some(done) = open {
        merged.push(done);
    }

    for (index, segment) in merged.iter_mut().enumerate() {
        segment.id = segment_id(index);
    }
    merged
}

/// Full transcript text: chunk texts joined with single spaces in chunk
/// order.
pub fn join_chunk_texts(chunks: &[ChunkTranscription]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        let chunk_text = chunk.result.text.trim();
        if chunk_text.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(chunk_text);
    }
    text
}

fn segment_id(index: usize) -> String {
    format!("seg_{index:03}")
}
