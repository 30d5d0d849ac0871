use crate::ports::outbound::SignatureVerifier;
use shared_crypto::verify_event_signature;
use shared_types::{Hash, PublicKey, Signature};

/// Ed25519 over the event hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519SignatureVerifier;

impl SignatureVerifier for Ed25519SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, hash: &Hash, signature: &Signature) -> bool {
        verify_event_signature(public_key, hash, signature)
    }
}
