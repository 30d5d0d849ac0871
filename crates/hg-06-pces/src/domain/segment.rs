//! Segment file naming and metadata

use std::path::{Path, PathBuf};

const PREFIX: &str = "pces-";
const EXTENSION: &str = ".log";

/// One segment file of the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Position in the stream; segments are replayed in sequence order.
    pub sequence: u64,
    /// Round the writer started from when this run of segments began.
    pub origin: u64,
    pub path: PathBuf,
    /// Bytes of valid records.
    pub size: u64,
    pub event_count: u64,
    /// Birth round range of the events, `None` while empty.
    pub birth_rounds: Option<(u64, u64)>,
}

impl SegmentInfo {
    pub fn new(directory: &Path, sequence: u64, origin: u64) -> Self {
        Self {
            sequence,
            origin,
            path: directory.join(file_name(sequence, origin)),
            size: 0,
            event_count: 0,
            birth_rounds: None,
        }
    }

    pub fn record_event(&mut self, birth_round: u64, bytes: u64) {
        self.size += bytes;
        self.event_count += 1;
        self.birth_rounds = Some(match self.birth_rounds {
            None => (birth_round, birth_round),
            Some((min, max)) => (min.min(birth_round), max.max(birth_round)),
        });
    }

    pub fn max_birth_round(&self) -> Option<u64> {
        self.birth_rounds.map(|(_, max)| max)
    }

    /// True if every event in the segment is below `threshold`.
    pub fn entirely_below(&self, threshold: u64) -> bool {
        self.max_birth_round().map_or(true, |max| max < threshold)
    }
}

pub fn file_name(sequence: u64, origin: u64) -> String {
    format!("{PREFIX}{sequence:010}-{origin}{EXTENSION}")
}

/// Parse `pces-<sequence>-<origin>.log`.
pub fn parse_file_name(name: &str) -> Option<(u64, u64)> {
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
    let (sequence, origin) = stem.split_once('-')?;
    Some((sequence.parse().ok()?, origin.parse().ok()?))
}
