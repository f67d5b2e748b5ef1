//! Core peer list components
//!
//! This module contains the fundamental building blocks:
//! - Addresses (IPv4 values, private range classification, resolution)
//! - Bounded address sets (fixed-capacity rings with sentinel-terminated scans)
//! - Shuffling with a 16-bit random source

pub mod address;
pub mod ring;

pub use address::{classify, Address, PrivateClass, Resolver, SystemResolver};
pub use ring::{BoundedAddressSet, Rand16, MAX_SHUFFLE_LEN};
