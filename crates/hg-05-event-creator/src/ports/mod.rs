//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::EventCreatorApi;
pub use outbound::CreatorIntake;
