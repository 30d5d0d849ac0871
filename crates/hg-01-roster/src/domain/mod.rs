//! Domain layer for the Roster subsystem

mod error;
mod history;
mod roster;

pub use error::*;
pub use history::*;
pub use roster::*;
