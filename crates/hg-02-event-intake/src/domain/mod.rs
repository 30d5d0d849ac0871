//! Event intake domain

mod config;
mod error;
mod known;
mod orphan_buffer;
mod outcome;
mod validation;

pub use config::*;
pub use error::*;
pub use known::*;
pub use orphan_buffer::*;
pub use outcome::*;
pub use validation::*;
