//! # Event Signing
//!
//! Creators sign the event hash; receivers verify it against the roster key.

use crate::signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{GossipEvent, Hash, NodeId, PublicKey, Signature, UnsignedEvent};

/// Signs events on behalf of the local node.
pub struct EventSigner {
    node_id: NodeId,
    keypair: Ed25519KeyPair,
}

impl EventSigner {
    pub fn new(node_id: NodeId, keypair: Ed25519KeyPair) -> Self {
        Self { node_id, keypair }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn public_key(&self) -> PublicKey {
        *self.keypair.public_key().as_bytes()
    }

    /// Sign an event body, producing the wire record.
    pub fn sign(&self, event: UnsignedEvent) -> GossipEvent {
        let hash = event.hash();
        let signature = *self.keypair.sign(&hash).as_bytes();
        GossipEvent { event, signature }
    }
}

/// Check an event signature against a creator key.
///
/// Malformed keys verify as `false`.
pub fn verify_event_signature(public_key: &PublicKey, hash: &Hash, signature: &Signature) -> bool {
    match Ed25519PublicKey::from_bytes(*public_key) {
        Ok(key) => key
            .verify(hash, &Ed25519Signature::from_bytes(*signature))
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(creator: u64) -> UnsignedEvent {
        UnsignedEvent {
            creator: NodeId(creator),
            self_parent: None,
            other_parent: None,
            time_created: 1_000,
            birth_round: 1,
            transactions: vec![],
        }
    }

    #[test]
    fn test_signed_event_verifies() {
        let signer = EventSigner::new(NodeId(0), Ed25519KeyPair::for_node(b"t", NodeId(0)));
        let gossip = signer.sign(body(0));

        assert!(verify_event_signature(
            &signer.public_key(),
            &gossip.event.hash(),
            &gossip.signature
        ));
    }

    #[test]
    fn test_tampered_event_fails() {
        let signer = EventSigner::new(NodeId(0), Ed25519KeyPair::for_node(b"t", NodeId(0)));
        let mut gossip = signer.sign(body(0));
        gossip.event.time_created += 1;

        assert!(!verify_event_signature(
            &signer.public_key(),
            &gossip.event.hash(),
            &gossip.signature
        ));
    }

    #[test]
    fn test_signature_from_other_node_fails() {
        let honest = EventSigner::new(NodeId(0), Ed25519KeyPair::for_node(b"t", NodeId(0)));
        let forger = EventSigner::new(NodeId(1), Ed25519KeyPair::for_node(b"t", NodeId(1)));
        let forged = forger.sign(body(0));

        assert!(!verify_event_signature(
            &honest.public_key(),
            &forged.event.hash(),
            &forged.signature
        ));
    }
}
