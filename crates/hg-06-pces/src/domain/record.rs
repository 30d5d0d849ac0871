//! Segment record framing
//!
//! ```text
//! [len: u32 LE][crc32: u32 LE][bincode GossipEvent; len bytes]
//! ```

use super::{PcesError, PcesResult};
use shared_types::GossipEvent;

/// Length plus checksum.
pub const RECORD_HEADER_BYTES: usize = 8;

/// Upper bound on a single encoded event.
pub const MAX_RECORD_BYTES: usize = 16 * 1024 * 1024;

/// Frame one event.
pub fn encode_record(event: &GossipEvent) -> PcesResult<Vec<u8>> {
    let payload = bincode::serialize(event).map_err(|e| PcesError::Codec(e.to_string()))?;
    if payload.len() > MAX_RECORD_BYTES {
        return Err(PcesError::RecordTooLarge(payload.len()));
    }
    let mut record = Vec::with_capacity(RECORD_HEADER_BYTES + payload.len());
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

/// Why decoding stopped before the end of the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TailState {
    /// Every byte belonged to a complete record.
    Clean,
    /// The final record was cut short.
    Torn,
    /// A record failed its checksum or could not be decoded.
    Corrupt,
}

/// Records decoded from a segment.
#[derive(Debug)]
pub struct DecodedSegment {
    pub events: Vec<GossipEvent>,
    /// Bytes covered by valid records.
    pub valid_bytes: u64,
    pub tail: TailState,
}

/// Decode every valid record, stopping at the first torn or corrupt one.
pub fn decode_records(bytes: &[u8]) -> DecodedSegment {
    let mut events = Vec::new();
    let mut cursor = 0usize;
    let tail = loop {
        if cursor == bytes.len() {
            break TailState::Clean;
        }
        if cursor + RECORD_HEADER_BYTES > bytes.len() {
            break TailState::Torn;
        }
        let len = u32::from_le_bytes([
            bytes[cursor],
            bytes[cursor + 1],
            bytes[cursor + 2],
            bytes[cursor + 3],
        ]) as usize;
        let crc = u32::from_le_bytes([
            bytes[cursor + 4],
            bytes[cursor + 5],
            bytes[cursor + 6],
            bytes[cursor + 7],
        ]);
        if len > MAX_RECORD_BYTES {
            break TailState::Corrupt;
        }
        let start = cursor + RECORD_HEADER_BYTES;
        if start + len > bytes.len() {
            break TailState::Torn;
        }
        let payload = &bytes[start..start + len];
        if crc32fast::hash(payload) != crc {
            break TailState::Corrupt;
        }
        match bincode::deserialize::<GossipEvent>(payload) {
            Ok(event) => events.push(event),
            Err(_) => break TailState::Corrupt,
        }
        cursor = start + len;
    };
    DecodedSegment {
        events,
        valid_bytes: cursor as u64,
        tail,
    }
}
