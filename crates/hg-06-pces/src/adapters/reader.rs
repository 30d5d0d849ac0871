//! Segment discovery and replay

use crate::domain::{
    decode_records, parse_file_name, DecodedSegment, PcesResult, SegmentInfo, TailState,
};
use shared_types::GossipEvent;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Segment files in `directory`, ordered by sequence number.
pub fn list_segments(directory: &Path) -> PcesResult<Vec<(u64, u64, PathBuf)>> {
    if !directory.exists() {
        return Ok(Vec::new());
    }
    let mut segments = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some((sequence, origin)) = name.to_str().and_then(parse_file_name) {
            segments.push((sequence, origin, entry.path()));
        }
    }
    segments.sort_by_key(|(sequence, _, _)| *sequence);
    Ok(segments)
}

/// Decode one segment and rebuild its metadata.
pub fn read_segment(
    path: &Path,
    sequence: u64,
    origin: u64,
) -> PcesResult<(SegmentInfo, DecodedSegment)> {
    let bytes = std::fs::read(path)?;
    let decoded = decode_records(&bytes);
    let mut info = SegmentInfo {
        sequence,
        origin,
        path: path.to_path_buf(),
        size: 0,
        event_count: 0,
        birth_rounds: None,
    };
    for event in &decoded.events {
        info.record_event(event.event.birth_round, 0);
    }
    info.size = decoded.valid_bytes;
    Ok((info, decoded))
}

/// Events recovered from the stream.
#[derive(Debug, Default)]
pub struct ReplayOutcome {
    /// Non-ancient events in their original write order.
    pub events: Vec<GossipEvent>,
    pub segments_read: usize,
    /// Segments that ended in a torn or corrupt record.
    pub damaged_segments: usize,
}

/// Read every segment in order and return the events whose birth round is at
/// least `ancient_threshold`.
pub fn replay(directory: &Path, ancient_threshold: u64) -> PcesResult<ReplayOutcome> {
    let mut outcome = ReplayOutcome::default();
    for (sequence, origin, path) in list_segments(directory)? {
        let (info, decoded) = read_segment(&path, sequence, origin)?;
        outcome.segments_read += 1;
        if decoded.tail != TailState::Clean {
            outcome.damaged_segments += 1;
            warn!(
                segment = %path.display(),
                valid_bytes = decoded.valid_bytes,
                tail = ?decoded.tail,
                "PCES segment ends in an incomplete record"
            );
        }
        if info.entirely_below(ancient_threshold) {
            continue;
        }
        outcome.events.extend(
            decoded
                .events
                .into_iter()
                .filter(|e| e.event.birth_round >= ancient_threshold),
        );
    }
    info!(
        events = outcome.events.len(),
        segments = outcome.segments_read,
        ancient_threshold,
        "PCES replay complete"
    );
    Ok(outcome)
}
