//! # PCES Writer
//!
//! Appends events to the active segment. `flush` makes everything appended
//! so far durable (`fsync`). Segments rotate by size; a restart or a
//! discontinuity always begins a fresh segment, so one file never mixes two
//! runs of the stream.

use super::lock::DirectoryLock;
use super::reader::{list_segments, read_segment};
use crate::domain::{encode_record, PcesConfig, PcesResult, SegmentInfo, TailState};
use shared_types::GossipEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

struct ActiveSegment {
    info: SegmentInfo,
    file: BufWriter<File>,
}

pub struct PcesWriter {
    config: PcesConfig,
    _lock: DirectoryLock,
    closed: Vec<SegmentInfo>,
    active: Option<ActiveSegment>,
    next_sequence: u64,
    origin: u64,
}

impl PcesWriter {
    /// Lock the directory, recover segment metadata and truncate torn tails.
    pub fn open(config: PcesConfig, origin: u64) -> PcesResult<Self> {
        let lock = DirectoryLock::acquire(&config.directory)?;

        let mut closed = Vec::new();
        for (sequence, segment_origin, path) in list_segments(&config.directory)? {
            let (info, decoded) = read_segment(&path, sequence, segment_origin)?;
            if decoded.tail != TailState::Clean {
                warn!(
                    segment = %path.display(),
                    valid_bytes = decoded.valid_bytes,
                    "Truncating incomplete PCES record"
                );
                let file = OpenOptions::new().write(true).open(&path)?;
                file.set_len(decoded.valid_bytes)?;
                file.sync_all()?;
            }
            closed.push(info);
        }
        let next_sequence = closed.last().map(|s| s.sequence + 1).unwrap_or(0);

        info!(
            directory = %config.directory.display(),
            segments = closed.len(),
            next_sequence,
            origin,
            "PCES writer opened"
        );
        Ok(Self {
            config,
            _lock: lock,
            closed,
            active: None,
            next_sequence,
            origin,
        })
    }

    /// Buffer one event. Not durable until `flush`.
    pub fn append(&mut self, event: &GossipEvent) -> PcesResult<()> {
        let record = encode_record(event)?;
        let mut active = match self.active.take() {
            Some(active) => active,
            None => self.new_segment()?,
        };
        active.file.write_all(&record)?;
        active
            .info
            .record_event(event.event.birth_round, record.len() as u64);

        if active.info.size >= self.config.max_segment_bytes {
            self.close(active)?;
        } else {
            self.active = Some(active);
        }
        Ok(())
    }

    /// Write buffered records and `fsync` the active segment.
    pub fn flush(&mut self) -> PcesResult<()> {
        if let Some(active) = self.active.as_mut() {
            active.file.flush()?;
            active.file.get_ref().sync_data()?;
        }
        Ok(())
    }

    /// Close the active segment; later events start a run with `origin`.
    pub fn begin_discontinuity(&mut self, origin: u64) -> PcesResult<()> {
        if let Some(active) = self.active.take() {
            self.close(active)?;
        }
        info!(previous = self.origin, origin, "PCES discontinuity");
        self.origin = origin;
        Ok(())
    }

    /// Delete closed segments whose events are all below `minimum_birth_round`.
    ///
    /// The active segment is never deleted.
    pub fn prune(&mut self, minimum_birth_round: u64) -> PcesResult<usize> {
        let (prunable, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.closed)
            .into_iter()
            .partition(|s| s.entirely_below(minimum_birth_round));
        self.closed = kept;

        let mut removed = 0;
        for segment in &prunable {
            match std::fs::remove_file(&segment.path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if removed > 0 {
            debug!(removed, minimum_birth_round, "Pruned PCES segments");
        }
        Ok(removed)
    }

    /// Closed segments followed by the active one.
    pub fn segments(&self) -> impl Iterator<Item = &SegmentInfo> {
        self.closed
            .iter()
            .chain(self.active.as_ref().map(|a| &a.info))
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    fn new_segment(&mut self) -> PcesResult<ActiveSegment> {
        let info = SegmentInfo::new(&self.config.directory, self.next_sequence, self.origin);
        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&info.path)?;
        self.next_sequence += 1;
        debug!(segment = %info.path.display(), "Started PCES segment");
        Ok(ActiveSegment {
            info,
            file: BufWriter::with_capacity(self.config.write_buffer_bytes, file),
        })
    }

    fn close(&mut self, mut active: ActiveSegment) -> PcesResult<()> {
        active.file.flush()?;
        active.file.get_ref().sync_all()?;
        debug!(
            segment = %active.info.path.display(),
            events = active.info.event_count,
            bytes = active.info.size,
            "Closed PCES segment"
        );
        self.closed.push(active.info);
        Ok(())
    }
}

impl Drop for PcesWriter {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = self.close(active) {
                warn!(error = %e, "Failed to close PCES segment");
            }
        }
    }
}
