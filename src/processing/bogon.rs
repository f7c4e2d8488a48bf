//! Well-known bogon blocks: reserved, private and otherwise
//! non-globally-routable IPv4 and IPv6 space.

use super::SubnetSet;
use crate::models::{Address, Subnet};
use lazy_static::lazy_static;

const BOGON_BLOCKS: [&str; 26] = [
    // IPv4
    "0.0.0.0/8",       // "this" network
    "10.0.0.0/8",      // private use
    "100.64.0.0/10",   // shared address space (CGN)
    "127.0.0.0/8",     // loopback
    "169.254.0.0/16",  // link local
    "172.16.0.0/12",   // private use
    "192.0.0.0/24",    // IETF protocol assignments
    "192.0.2.0/24",    // TEST-NET-1
    "192.168.0.0/16",  // private use
    "198.18.0.0/15",   // benchmarking
    "198.51.100.0/24", // TEST-NET-2
    "203.0.113.0/24",  // TEST-NET-3
    "224.0.0.0/4",     // multicast
    "240.0.0.0/4",     // reserved, includes limited broadcast
    // IPv6
    "::/128",         // unspecified
    "::1/128",        // loopback
    "::ffff:0:0/96",  // IPv4-mapped
    "64:ff9b::/96",   // IPv4/IPv6 translation
    "100::/64",       // discard only
    "2001::/23",      // IETF protocol assignments
    "2001:db8::/32",  // documentation
    "2002::/16",      // 6to4
    "fc00::/7",       // unique local
    "fe80::/10",      // link local
    "fec0::/10",      // site local (deprecated)
    "ff00::/8",       // multicast
];

lazy_static! {
    static ref BOGONS: SubnetSet = BOGON_BLOCKS
        .iter()
        .map(|s| s.parse::<Subnet>().expect("Invalid bogon block?"))
        .collect();
}

/// The process-wide bogon set. Built on first use, read-only afterwards.
pub fn bogons() -> &'static SubnetSet {
    &BOGONS
}

/// True iff `address` falls in a bogon block.
pub fn is_bogon(address: &Address) -> bool {
    BOGONS.contains(address)
}
