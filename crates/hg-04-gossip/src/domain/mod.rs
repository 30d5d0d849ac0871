//! Gossip domain

mod config;
mod error;
mod fallen_behind;
mod messages;
mod peers;
mod shadowgraph;

pub use config::*;
pub use error::*;
pub use fallen_behind::*;
pub use messages::*;
pub use peers::*;
pub use shadowgraph::*;
