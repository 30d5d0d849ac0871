//! # hg-01-roster
//!
//! Membership and stake-weight table for the hashgraph.
//!
//! ## Architecture
//!
//! A `Roster` is immutable once built. Every stake threshold used by the
//! virtual-voting engine, gossip and intake is computed here so the whole
//! node agrees on what "supermajority" means:
//!
//! | Threshold | Rule |
//! |-----------|------|
//! | supermajority | `3w > 2·total` |
//! | majority | `2w > total` |
//! | strong minority | `3w ≥ total` |
//!
//! `RosterHistory` keeps the rosters scheduled at round boundaries; a new
//! roster supersedes the previous one only from its transition round on.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hg_01_roster::{Roster, RosterEntry, RosterHistory};
//!
//! let roster = Roster::new(entries)?;
//! let history = RosterHistory::new(roster);
//! let active = history.roster_for_round(round)?;
//! assert!(active.is_supermajority(weight));
//! ```

pub mod domain;

pub use domain::{
    Roster, RosterEntry, RosterError, RosterHistory, RosterResult, RosterTransition,
};
