//! # Genesis Roster Builder
//!
//! Derives every member's signing key from the network secret and builds
//! the round-zero roster.

use hg_01_roster::{Roster, RosterEntry, RosterError, RosterHistory};
use shared_crypto::{Ed25519KeyPair, EventSigner};
use shared_types::{Hash, NodeId};
use thiserror::Error;

/// Genesis creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Invalid genesis configuration.
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// Genesis configuration.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Key material for member identities.
    pub network_secret: Vec<u8>,
    /// Stake of each member; member `i` is `NodeId(i)`.
    pub weights: Vec<u64>,
}

impl GenesisConfig {
    /// `count` members of equal weight.
    pub fn uniform(network_secret: &[u8], count: usize) -> Self {
        Self {
            network_secret: network_secret.to_vec(),
            weights: vec![1; count],
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.network_secret.is_empty() {
            return Err(GenesisError::InvalidConfig(
                "Network secret must not be empty".to_string(),
            ));
        }
        if self.weights.is_empty() {
            return Err(GenesisError::InvalidConfig(
                "Genesis roster needs at least one member".to_string(),
            ));
        }
        Ok(())
    }
}

/// The genesis roster and the member identities behind it.
pub struct Genesis {
    pub roster: Roster,
    network_secret: Vec<u8>,
}

impl Genesis {
    pub fn rosters(&self) -> RosterHistory {
        RosterHistory::new(self.roster.clone())
    }

    pub fn roster_hash(&self) -> Hash {
        self.roster.hash()
    }

    pub fn members(&self) -> Vec<NodeId> {
        self.roster.members().collect()
    }

    /// Signing identity of `node`.
    pub fn signer(&self, node: NodeId) -> Option<EventSigner> {
        self.roster
            .contains(node)
            .then(|| member_signer(&self.network_secret, node))
    }
}

/// Builder for the genesis roster.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Genesis, GenesisError> {
        self.config.validate()?;

        let signers: Vec<EventSigner> = (0..self.config.weights.len())
            .map(|i| member_signer(&self.config.network_secret, NodeId(i as u64)))
            .collect();
        let entries = signers
            .iter()
            .zip(&self.config.weights)
            .map(|(signer, weight)| {
                RosterEntry::new(signer.node_id(), signer.public_key(), *weight)
            })
            .collect();
        let roster = Roster::new(entries)?;

        tracing::info!(
            members = roster.len(),
            total_weight = roster.total_weight(),
            roster_hash = %hex::encode(&roster.hash()[..8]),
            "Genesis roster built"
        );
        Ok(Genesis {
            roster,
            network_secret: self.config.network_secret,
        })
    }
}

fn member_signer(network_secret: &[u8], node: NodeId) -> EventSigner {
    EventSigner::new(node, Ed25519KeyPair::for_node(network_secret, node))
}
