//! Peer reputation
//!
//! Admission and ban policy over the node's peer lists.
//!
//! # Features
//! - Recent and trusted peer lists
//! - Private address filtering
//! - Tiered pink list (current, last and epoch tiers)
//! - Epoch rollover and purge hooks

pub mod peers;
pub mod pinklist;
pub mod policy;

pub use peers::{admit, render_grid, ListKind, PeerListStats, PeerLists};
pub use pinklist::PinkList;
pub use policy::PolicyFlags;
