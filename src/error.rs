//! Error types for address, subnet and subnet set operations.
//!
//! Every fallible entry point returns [`IpError`]. Callers that only care
//! about the cause can branch on [`IpError::kind`].

use crate::models::IpFamily;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IpError>;

/// The cause of an [`IpError`], without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed text input.
    Format,
    /// Numeric value outside the family's legal domain.
    Range,
    /// Fixed-width binary input of the wrong size.
    Length,
    /// Operation needs both operands in the same IP family.
    FamilyMismatch,
    /// Merge needs equal prefix lengths.
    PrefixMismatch,
    /// Merge needs two adjacent sibling subnets.
    NotAdjacent,
    /// IPv4 extraction from an IPv6 address outside `::ffff:0:0/96`.
    NotMapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpError {
    #[error("invalid address text '{input}': {reason}")]
    Format { input: String, reason: &'static str },
    #[error("value out of range: {0}")]
    Range(String),
    #[error("{family} needs {expected} fixed-width groups, got {actual}")]
    Length {
        family: IpFamily,
        expected: usize,
        actual: usize,
    },
    #[error("address family mismatch: {left} vs {right}")]
    FamilyMismatch { left: IpFamily, right: IpFamily },
    #[error("prefix length mismatch: /{left} vs /{right}")]
    PrefixMismatch { left: u8, right: u8 },
    #[error("subnets {left} and {right} are not adjacent siblings")]
    NotAdjacent { left: String, right: String },
    #[error("{0} is not an IPv4-mapped IPv6 address")]
    NotMapped(String),
}

impl IpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IpError::Format { .. } => ErrorKind::Format,
            IpError::Range(_) => ErrorKind::Range,
            IpError::Length { .. } => ErrorKind::Length,
            IpError::FamilyMismatch { .. } => ErrorKind::FamilyMismatch,
            IpError::PrefixMismatch { .. } => ErrorKind::PrefixMismatch,
            IpError::NotAdjacent { .. } => ErrorKind::NotAdjacent,
            IpError::NotMapped(_) => ErrorKind::NotMapped,
        }
    }

    pub(crate) fn format(input: &str, reason: &'static str) -> IpError {
        IpError::Format {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn family_check(left: IpFamily, right: IpFamily) -> Result<()> {
        if left == right {
            Ok(())
        } else {
            Err(IpError::FamilyMismatch { left, right })
        }
    }
}
