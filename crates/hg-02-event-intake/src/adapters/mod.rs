//! Intake adapters

mod signature;

pub use signature::Ed25519SignatureVerifier;
