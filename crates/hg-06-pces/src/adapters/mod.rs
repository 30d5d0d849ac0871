//! File-backed PCES adapters

pub mod lock;
pub mod reader;
pub mod writer;

pub use lock::DirectoryLock;
pub use reader::{list_segments, read_segment, replay, ReplayOutcome};
pub use writer::PcesWriter;
