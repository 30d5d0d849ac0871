//! PCES domain: record framing, segment metadata and configuration

mod config;
mod error;
mod record;
mod segment;

pub use config::*;
pub use error::*;
pub use record::*;
pub use segment::*;
