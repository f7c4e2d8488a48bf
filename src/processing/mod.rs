//! Subnet collection logic.
//!
//! This module contains the set-level operations built on [`Subnet`](crate::models::Subnet):
//! - [`subnet_set`] - normalized, minimal set of non-overlapping subnets
//! - [`bogon`] - the shared bogon preset

mod bogon;
mod subnet_set;

// Re-export public functions
pub use bogon::{bogons, is_bogon};
pub use subnet_set::SubnetSet;
