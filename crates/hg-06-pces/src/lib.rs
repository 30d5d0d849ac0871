//! # hg-06-pces
//!
//! Preconsensus Event Stream: a durable, segmented log of every event
//! accepted by intake, written before the event reaches the hashgraph.
//!
//! ## Overview
//!
//! - **Write-ahead**: `append` buffers, `flush` writes and `fsync`s
//! - **Segments**: `pces-<sequence>-<origin>.log`, rotated by size
//! - **Replay**: segments in sequence order, ancient events filtered, torn
//!   tails tolerated (and truncated when a writer reopens the directory)
//! - **Pruning**: whole segments below the ancient threshold are deleted
//!
//! ## Record format
//!
//! ```text
//! [len: u32 LE][crc32: u32 LE][bincode GossipEvent]
//! ```

pub mod adapters;
pub mod domain;

pub use adapters::{replay, DirectoryLock, PcesWriter, ReplayOutcome};
pub use domain::{PcesConfig, PcesError, PcesResult, SegmentInfo};
