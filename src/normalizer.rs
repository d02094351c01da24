//! Extraction of canonical networks from raw blocklist lines.
//!
//! Upstream feeds mix several formats:
//! - plain addresses or CIDR networks, one per line (FireHOL, Blocklist.de, Tor)
//! - addresses followed by `;` or `#` comments (Spamhaus DROP/EDROP)
//! - tab-separated `start\tmask\tcount` records (DShield)
//!
//! [`normalize`] accepts any of them and returns the canonical network, or
//! `None` for anything that is not a valid address. Rejections are not errors.

use ipnet::IpNet;
use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr};

use crate::address::{AddressSet, NetworkAddress};

/// Parse one raw source line into a canonical network.
///
/// # Examples
/// ```
/// use routeros_blacklist::normalizer::normalize;
/// assert_eq!(normalize("1.2.3.4/24").unwrap().to_string(), "1.2.3.0/24");
/// assert_eq!(normalize("1.2.3.4 # bad actor").unwrap().to_string(), "1.2.3.4/32");
/// assert!(normalize("# just a comment").is_none());
/// ```
pub fn normalize(raw_line: &str) -> Option<NetworkAddress> {
    let line = raw_line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        return None;
    }

    let line = strip_comment(line, '#');
    let line = strip_comment(line, ';');

    let record = if line.contains('\t') {
        tab_record(line)
    } else {
        Cow::Borrowed(line)
    };

    // Only the first token counts, even if later text looks like an address
    let candidate = record.split_whitespace().next()?;
    parse_network(candidate)
}

/// Normalize every line, collapsing duplicates.
pub fn normalize_lines<I, S>(lines: I) -> AddressSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| normalize(line.as_ref()))
        .collect()
}

/// Truncate at the first `marker` and trim the remainder.
fn strip_comment(line: &str, marker: char) -> &str {
    match line.find(marker) {
        Some(idx) => line[..idx].trim(),
        None => line,
    }
}

/// `address\tmask[\t...]` becomes `address/prefix`.
///
/// A missing or unparseable mask leaves the address alone.
fn tab_record(line: &str) -> Cow<'_, str> {
    let mut fields = line.split('\t');
    let address = fields.next().unwrap_or_default().trim();

    match fields.next().and_then(|mask| dotted_mask_bits(mask.trim())) {
        Some(bits) => Cow::Owned(format!("{}/{}", address, bits)),
        None => Cow::Borrowed(address),
    }
}

/// Count the set bits of a dotted-decimal mask (`255.255.255.0` -> 24).
///
/// Requires exactly four decimal octets. Contiguity is not checked.
fn dotted_mask_bits(mask: &str) -> Option<u32> {
    let octets: Vec<&str> = mask.split('.').collect();
    if octets.len() != 4 {
        return None;
    }

    octets.iter().try_fold(0u32, |bits, octet| {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u8 = octet.parse().ok()?;
        Some(bits + value.count_ones())
    })
}

/// Validate an address or CIDR candidate (non-strict: host bits are masked).
fn parse_network(candidate: &str) -> Option<NetworkAddress> {
    match candidate.split_once('/') {
        Some((addr, prefix)) => {
            let ip: IpAddr = addr.parse().ok()?;
            let prefix_len = parse_prefix(ip, prefix)?;
            IpNet::new(ip, prefix_len).ok().map(NetworkAddress::new)
        }
        None => candidate.parse::<IpAddr>().ok().map(NetworkAddress::host),
    }
}

/// Prefix after `/`: a decimal length, or for IPv4 a netmask or hostmask.
fn parse_prefix(ip: IpAddr, prefix: &str) -> Option<u8> {
    if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
        return prefix.parse().ok();
    }

    match ip {
        IpAddr::V4(_) => {
            let mask: Ipv4Addr = prefix.parse().ok()?;
            let mask = u32::from(mask);
            contiguous_prefix(mask).or_else(|| contiguous_prefix(!mask))
        }
        IpAddr::V6(_) => None,
    }
}

/// Prefix length of a netmask, or `None` when its ones are not contiguous.
fn contiguous_prefix(mask: u32) -> Option<u8> {
    let ones = mask.leading_ones();
    let rest = mask.checked_shl(ones).unwrap_or(0);
    (rest == 0).then_some(ones as u8)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ipv4_cidr_string_strategy() -> impl Strategy<Value = String> {
        (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255, 0u8..=32)
            .prop_map(|(a, b, c, d, prefix)| format!("{}.{}.{}.{}/{}", a, b, c, d, prefix))
    }

    proptest! {
        /// Arbitrary input never panics
        #[test]
        fn prop_normalize_arbitrary_no_panic(line in ".*") {
            let _ = normalize(&line);
        }

        /// Valid CIDRs are always accepted
        #[test]
        fn prop_valid_cidr_accepted(cidr in ipv4_cidr_string_strategy()) {
            prop_assert!(normalize(&cidr).is_some());
        }

        /// Normalizing a canonical form is a fixed point
        #[test]
        fn prop_normalize_idempotent(cidr in ipv4_cidr_string_strategy()) {
            let first = normalize(&cidr).unwrap();
            let second = normalize(&first.to_string()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Trailing comments never change the result
        #[test]
        fn prop_comment_ignored(cidr in ipv4_cidr_string_strategy(), comment in "[a-zA-Z0-9 ]{0,20}") {
            prop_assert_eq!(normalize(&cidr), normalize(&format!("{} # {}", cidr, comment)));
            prop_assert_eq!(normalize(&cidr), normalize(&format!("{} ; {}", cidr, comment)));
        }
    }
}
