//! IP classification for resolved candidate addresses.
//!
//! This module centralizes:
//! - Bogus address detection (loopback, null route, broadcast)
//! - RFC1918 private range detection
//! - The public/internal partition consumed by the probe pipeline
//!
//! Classification works on the dotted string forms the resolver hands back,
//! matching by exact value (bogus set) or by prefix (private ranges). The
//! partition decides whether the HTTP and content stages may dial at all:
//! candidates without a single public address are never connected to.

use crate::record::IpFlag;

/// Addresses that can never identify a squatted host.
const BOGUS_ADDRESSES: [&str; 5] = ["127.0.0.1", "0.0.0.0", "255.255.255.255", "::1", "localhost"];

/// Result of partitioning a candidate's resolved addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpClassification {
    pub public: Vec<String>,
    pub internal: Vec<String>,
    pub flags: Vec<IpFlag>,
}

/// Return true if the address is one of the bogus literals.
pub fn is_bogus(addr: &str) -> bool {
    BOGUS_ADDRESSES.contains(&addr)
}

/// Return true if the dotted form falls in an RFC1918 private range.
pub fn is_private(addr: &str) -> bool {
    if addr.starts_with("10.") || addr.starts_with("192.168.") {
        return true;
    }
    (16..=31).any(|octet| addr.starts_with(&format!("172.{octet}.")))
}

/// Partition addresses into public and internal sets and raise the matching
/// flags. Internal = bogus + private; the two output sets are disjoint and
/// together cover the input.
pub fn classify(addresses: &[String]) -> IpClassification {
    let mut result = IpClassification::default();

    for addr in addresses {
        if is_bogus(addr) || is_private(addr) {
            result.internal.push(addr.clone());
        } else {
            result.public.push(addr.clone());
        }

        let flag = if addr == "127.0.0.1" {
            Some(IpFlag::Localhost)
        } else if addr == "0.0.0.0" {
            Some(IpFlag::NullRoute)
        } else if addr.starts_with("10.") {
            Some(IpFlag::Private10)
        } else if addr.starts_with("192.168.") {
            Some(IpFlag::Private192)
        } else if is_private(addr) {
            Some(IpFlag::Private172)
        } else {
            None
        };
        if let Some(flag) = flag
            && !result.flags.contains(&flag)
        {
            result.flags.push(flag);
        }
    }

    result
}
