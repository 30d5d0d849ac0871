//! Hashgraph domain: virtual voting, fame elections and consensus ordering

mod config;
mod error;
mod hashgraph;
mod meta;
mod ordering;

pub use config::*;
pub use error::*;
pub use hashgraph::*;
pub use meta::*;
pub use ordering::*;
