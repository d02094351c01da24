//! Canonical network addresses and the sets built from them.

use ipnet::IpNet;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

/// A canonical IPv4 or IPv6 network in CIDR form.
///
/// Host bits beyond the prefix are always cleared, so two values are equal
/// exactly when their canonical strings are equal.
///
/// Ordering is total across families: every IPv4 network sorts before every
/// IPv6 network. Within a family networks are ordered by numeric network
/// address, then by prefix length (shorter first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkAddress(IpNet);

impl NetworkAddress {
    /// Build from any network, masking off host bits.
    pub fn new(net: IpNet) -> Self {
        Self(net.trunc())
    }

    /// A single host: /32 for IPv4, /128 for IPv6.
    pub fn host(addr: IpAddr) -> Self {
        Self(IpNet::from(addr))
    }

    /// Sort key: (family, numeric network address, prefix length)
    fn sort_key(&self) -> (u8, u128, u8) {
        match self.0 {
            IpNet::V4(v4) => (4, u32::from(v4.network()) as u128, v4.prefix_len()),
            IpNet::V6(v6) => (6, u128::from(v6.network()), v6.prefix_len()),
        }
    }
}

impl Ord for NetworkAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for NetworkAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<IpNet> for NetworkAddress {
    fn from(net: IpNet) -> Self {
        Self::new(net)
    }
}

/// Deduplicated set of addresses. Iteration yields the total order above.
pub type AddressSet = BTreeSet<NetworkAddress>;

/// Unique addresses contributed by each source, keyed (and sorted) by source name.
pub type SourceCount = BTreeMap<String, usize>;
