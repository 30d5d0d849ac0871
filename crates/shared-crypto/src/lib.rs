//! # Shared Crypto - Node Identity and Hashing
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Running hash, key derivation |
//! | `signatures` | Ed25519 | Node identity keys |
//! | `event_signing` | Ed25519 over SHA-256 event hash | Event signatures |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **BLAKE3**: Domain-separated key derivation for development keys

#![warn(missing_docs)]
#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod event_signing;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use event_signing::{verify_event_signature, EventSigner};
pub use hashing::{blake3_hash, blake3_hash_many, extend_running_hash, Blake3Hasher};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
