//! Peerlist: peer reputation and address lists for a P2P node
//!
//! This crate tracks which IPv4 peer addresses a node knows, trusts, has
//! recently seen, or has banned ("pink-listed"), featuring:
//! - Fixed-capacity ring buffers with sentinel-terminated scans
//! - Private address classification and filtering
//! - A three-tier pink list with epoch rollover
//! - Plain-text list files with delete-on-failure saves
//! - Fisher-Yates shuffling of dial candidates
//!
//! # Example
//!
//! ```rust
//! use peerlist::network::{ListKind, PeerLists, PolicyFlags};
//! use peerlist::storage::Capacities;
//! use peerlist::core::Address;
//!
//! let mut lists = PeerLists::new(&Capacities::default(), PolicyFlags::NO_PRIVATE);
//! let peer: Address = "1.2.3.4".parse().unwrap();
//!
//! assert!(lists.admit_peer(peer, ListKind::Recent));
//! assert!(!lists.admit_peer("10.0.0.1".parse().unwrap(), ListKind::Recent));
//!
//! // Misbehaving peer: pink-list it and drop it from the recent list
//! lists.ban(peer);
//! assert!(lists.is_banned(peer));
//! assert!(!lists.recent().contains(peer));
//!
//! // Epoch boundary: current bans carry over to the last tier
//! lists.roll_epoch();
//! assert!(lists.is_banned(peer));
//! ```

pub mod cli;
pub mod core;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{classify, Address, BoundedAddressSet, PrivateClass, Resolver, SystemResolver};
pub use network::{ListKind, PeerListStats, PeerLists, PinkList, PolicyFlags};
pub use storage::{Capacities, ListConfig, ListError, ListFile, ListStore};
