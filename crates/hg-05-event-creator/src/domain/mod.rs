//! Event creator domain

mod config;
mod error;
mod policy;
mod pool;
mod tips;

pub use config::*;
pub use error::*;
pub use policy::*;
pub use pool::*;
pub use tips::*;
