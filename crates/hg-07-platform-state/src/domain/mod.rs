//! Platform state domain

mod config;
mod error;
mod shared;
mod state;

pub use config::*;
pub use error::*;
pub use shared::*;
pub use state::*;
