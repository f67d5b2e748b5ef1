//! IPv4 peer addresses
//!
//! Peer lists store bare IPv4 addresses as 32-bit values. The value `0`
//! (0.0.0.0) is reserved as the "empty slot" sentinel and is never a
//! legal stored address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::str::FromStr;

// =============================================================================
// Address
// =============================================================================

/// A 32-bit IPv4 peer address.
///
/// The inner value is the big-endian interpretation of the four octets, so
/// the first octet on the wire is the most significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(u32);

impl Address {
    /// The empty-slot sentinel
    pub const EMPTY: Address = Address(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn from_octets(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(u32::from_be_bytes([a, b, c, d]))
    }

    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Octets in network order
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// True for the empty-slot sentinel
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Classify this address into a public or private range
    pub fn classify(self) -> PrivateClass {
        classify(self)
    }

    pub fn is_private(self) -> bool {
        self.classify().is_private()
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(u32::from(ip))
    }
}

impl From<Address> for Ipv4Addr {
    fn from(addr: Address) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad through Ipv4Addr so width/alignment flags are honoured
        fmt::Display::fmt(&Ipv4Addr::from(*self), f)
    }
}

impl FromStr for Address {
    type Err = std::net::AddrParseError;

    /// Parse dotted-decimal text. Hostnames go through a [`Resolver`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Addr>().map(Address::from)
    }
}

// =============================================================================
// Private Address Classifier
// =============================================================================

/// Address range classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivateClass {
    /// Publicly routable
    Public,
    /// 10.0.0.0/8
    ClassA,
    /// 172.16.0.0/12
    ClassB,
    /// 192.168.0.0/16
    ClassC,
    /// 169.254.0.0/16 (auto-configuration)
    LinkLocal,
}

impl PrivateClass {
    pub fn is_private(self) -> bool {
        self != PrivateClass::Public
    }
}

impl fmt::Display for PrivateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrivateClass::Public => "public",
            PrivateClass::ClassA => "private (class A)",
            PrivateClass::ClassB => "private (class B)",
            PrivateClass::ClassC => "private (class C)",
            PrivateClass::LinkLocal => "link-local",
        };
        f.write_str(name)
    }
}

/// Classify an address by its first two octets.
pub fn classify(addr: Address) -> PrivateClass {
    match addr.octets() {
        [10, ..] => PrivateClass::ClassA,
        [172, 16..=31, ..] => PrivateClass::ClassB,
        [192, 168, ..] => PrivateClass::ClassC,
        [169, 254, ..] => PrivateClass::LinkLocal,
        _ => PrivateClass::Public,
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Converts list-file tokens (dotted-decimal or hostnames) to addresses.
pub trait Resolver {
    /// Resolve `host` to an IPv4 address, or `None` if it cannot be.
    fn resolve(&self, host: &str) -> Option<Address>;
}

/// Resolver backed by the operating system's name lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<Address> {
        if let Ok(addr) = host.parse::<Address>() {
            return Some(addr);
        }

        match (host, 0u16).to_socket_addrs() {
            Ok(mut addrs) => addrs.find_map(|sa| match sa {
                SocketAddr::V4(v4) => Some(Address::from(*v4.ip())),
                SocketAddr::V6(_) => None,
            }),
            Err(e) => {
                log::debug!("Failed to resolve {}: {}", host, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_classify_ranges() {
        assert_eq!(classify(addr("10.1.2.3")), PrivateClass::ClassA);
        assert_eq!(classify(addr("172.20.0.1")), PrivateClass::ClassB);
        assert_eq!(classify(addr("172.32.0.1")), PrivateClass::Public);
        assert_eq!(classify(addr("192.168.1.1")), PrivateClass::ClassC);
        assert_eq!(classify(addr("169.254.0.5")), PrivateClass::LinkLocal);
        assert_eq!(classify(addr("8.8.8.8")), PrivateClass::Public);
    }

    #[test]
    fn test_classify_class_b_bounds() {
        assert_eq!(classify(addr("172.15.255.255")), PrivateClass::Public);
        assert_eq!(classify(addr("172.16.0.0")), PrivateClass::ClassB);
        assert_eq!(classify(addr("172.31.255.255")), PrivateClass::ClassB);
        assert_eq!(classify(addr("192.169.0.1")), PrivateClass::Public);
        assert_eq!(classify(addr("169.253.0.1")), PrivateClass::Public);
    }

    #[test]
    fn test_octet_order() {
        let a = Address::from_octets(1, 2, 3, 4);
        assert_eq!(a.octets(), [1, 2, 3, 4]);
        assert_eq!(a.to_string(), "1.2.3.4");
        assert_eq!(a, addr("1.2.3.4"));
        assert_eq!(Ipv4Addr::from(a), Ipv4Addr::new(1, 2, 3, 4));
    }

    #[test]
    fn test_display_padding() {
        let a = Address::from_octets(8, 8, 4, 4);
        assert_eq!(format!("{:<10}|", a), "8.8.4.4   |");
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(Address::EMPTY.is_empty());
        assert!(addr("0.0.0.0").is_empty());
        assert!(!addr("0.0.0.1").is_empty());
    }

    #[test]
    fn test_system_resolver_dotted() {
        let resolver = SystemResolver;
        assert_eq!(resolver.resolve("1.2.3.4"), Some(addr("1.2.3.4")));
    }
}
