//! IPv4/IPv6 address and CIDR subnet values with set arithmetic.
//!
//! - [`Address`] - family-tagged address with text parsing and offset arithmetic
//! - [`Subnet`] - containment, adjacency, merge, split and subtract
//! - [`range_to_subnets`] - minimal CIDR cover of an address range
//! - [`SubnetSet`] - normalized set of non-overlapping subnets
//! - [`bogons`] - shared set of non-routable blocks

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{ErrorKind, IpError, Result};
pub use models::{range_to_subnets, Address, IpFamily, Subnet, SubnetAddresses, SubnetSplit};
pub use processing::{bogons, is_bogon, SubnetSet};
