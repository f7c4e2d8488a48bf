//! Value types for IP addresses and subnets.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`IpFamily`] - IPv4/IPv6 tag and per-family capabilities
//! - [`Address`] - family-tagged address value
//! - [`Subnet`] - CIDR block with containment, merge, split and subtract
//! - [`range_to_subnets`] - minimal CIDR cover of an address range

mod address;
mod family;
mod range;
pub(crate) mod subnet;
mod text;

// Re-export public types
pub use address::Address;
pub use family::IpFamily;
pub use range::range_to_subnets;
pub use subnet::{Subnet, SubnetAddresses, SubnetSplit};
