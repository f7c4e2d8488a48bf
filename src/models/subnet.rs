//! CIDR subnet value and its arithmetic.
//!
//! A [`Subnet`] always stores its network address: construction masks off
//! host bits instead of rejecting them.

use super::range::decompose;
use super::{Address, IpFamily};
use crate::error::{IpError, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

/// An (address, prefix length) pair aligned to its network boundary.
///
/// Ordering compares family, then base address, then prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subnet {
    base: Address,
    prefix: u8,
}

impl Subnet {
    /// Create a subnet, masking `address` down to the network boundary.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::{Address, Subnet};
    /// let addr: Address = "192.0.2.77".parse().unwrap();
    /// let net = Subnet::new(addr, 24).unwrap();
    /// assert_eq!(net.to_text(), "192.0.2.0/24");
    /// assert!(Subnet::new(addr, 33).is_err());
    /// ```
    pub fn new(address: Address, prefix_length: u8) -> Result<Subnet> {
        if prefix_length > address.bit_length() {
            return Err(IpError::Range(format!(
                "prefix length /{prefix_length} exceeds {} bits",
                address.bit_length()
            )));
        }
        Ok(Subnet::aligned(address, prefix_length))
    }

    /// Caller guarantees `prefix_length <= address.bit_length()`.
    pub(crate) fn aligned(address: Address, prefix_length: u8) -> Subnet {
        let family = address.family();
        Subnet {
            base: Address::with_bits(family, address.bits() & family.netmask(prefix_length)),
            prefix: prefix_length,
        }
    }

    /// Single-host subnet (`/32` or `/128`).
    pub fn host(address: Address) -> Subnet {
        Subnet {
            base: address,
            prefix: address.bit_length(),
        }
    }

    /// Parse `"<address>/<prefix>"`. Every failure, including an out of
    /// range prefix, is reported as a format error.
    pub fn from_text(s: &str) -> Result<Subnet> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(IpError::format(s, "expected <address>/<prefix>"));
        }
        let address = Address::from_text(parts[0])?;
        let prefix = parts[1];
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IpError::format(s, "prefix is not a decimal number"));
        }
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| IpError::format(s, "prefix length out of range"))?;
        Subnet::new(address, prefix).map_err(|_| IpError::format(s, "prefix length out of range"))
    }

    /// Minimal ordered CIDR cover of the inclusive range `start..=end`.
    pub fn range_to_subnets(start: Address, end: Address) -> Result<Vec<Subnet>> {
        super::range::range_to_subnets(start, end)
    }

    pub fn to_text(&self) -> String {
        format!("{}/{}", self.base, self.prefix)
    }

    pub fn family(&self) -> IpFamily {
        self.base.family()
    }

    pub fn bit_length(&self) -> u8 {
        self.base.bit_length()
    }

    pub fn base_address(&self) -> Address {
        self.base
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix
    }

    pub fn netmask(&self) -> Address {
        Address::with_bits(self.family(), self.family().netmask(self.prefix))
    }

    pub fn wildcard(&self) -> Address {
        Address::with_bits(self.family(), self.family().hostmask(self.prefix))
    }

    /// Number of addresses; `2^128` for `::/0`, hence the big integer.
    pub fn size(&self) -> BigUint {
        BigUint::one() << usize::from(self.bit_length() - self.prefix)
    }

    /// Highest address in the subnet (the broadcast address for IPv4).
    pub fn last_address(&self) -> Address {
        Address::with_bits(self.family(), self.last_bits())
    }

    fn last_bits(&self) -> u128 {
        self.base.bits() | self.family().hostmask(self.prefix)
    }

    pub fn contains(&self, address: &Address) -> bool {
        address.family() == self.family()
            && address.bits() & self.family().netmask(self.prefix) == self.base.bits()
    }

    pub fn contains_subnet(&self, other: &Subnet) -> bool {
        self.prefix <= other.prefix && self.contains(&other.base)
    }

    /// CIDR blocks either nest or are disjoint, so overlap is containment
    /// in one direction or the other.
    pub fn overlaps(&self, other: &Subnet) -> bool {
        self.contains_subnet(other) || other.contains_subnet(self)
    }

    /// Address at `index`; negative indexes count back from the end, so
    /// `-1` is the last address. `None` when out of bounds.
    pub fn address_at<I: Into<BigInt>>(&self, index: I) -> Option<Address> {
        let size = BigInt::from(self.size());
        let mut index: BigInt = index.into();
        if index.is_negative() {
            index += &size;
        }
        if index.is_negative() || index >= size {
            return None;
        }
        let offset = index.to_u128()?;
        Some(Address::with_bits(self.family(), self.base.bits() + offset))
    }

    /// Lazy ascending iterator over every address. This can be up to 2^128
    /// items long; use [`contains`](Self::contains) for membership.
    pub fn addresses(&self) -> SubnetAddresses {
        SubnetAddresses {
            family: self.family(),
            next: Some(self.base.bits()),
            last: self.last_bits(),
        }
    }

    /// True iff the two ranges touch with no gap, in either order.
    pub fn is_adjacent(&self, other: &Subnet) -> Result<bool> {
        IpError::family_check(self.family(), other.family())?;
        let follows = |a: &Subnet, b: &Subnet| a.last_bits().checked_add(1) == Some(b.base.bits());
        Ok(follows(self, other) || follows(other, self))
    }

    /// True iff `merge` would succeed. Never fails.
    pub fn can_merge(&self, other: &Subnet) -> bool {
        self.prefix == other.prefix
            && self.is_adjacent(other).unwrap_or(false)
            && self.is_sibling_of(other)
    }

    /// Adjacent equal-size blocks only form one CIDR block when the lower
    /// one sits on the parent's boundary.
    fn is_sibling_of(&self, other: &Subnet) -> bool {
        if self.prefix == 0 {
            return false;
        }
        let lower = self.base.min(other.base);
        lower.bits() & self.family().hostmask(self.prefix - 1) == 0
    }

    /// Join two sibling subnets into their common parent.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::Subnet;
    /// let a: Subnet = "192.0.2.0/25".parse().unwrap();
    /// let b: Subnet = "192.0.2.128/25".parse().unwrap();
    /// assert_eq!(a.merge(&b).unwrap().to_text(), "192.0.2.0/24");
    /// ```
    pub fn merge(&self, other: &Subnet) -> Result<Subnet> {
        IpError::family_check(self.family(), other.family())?;
        if self.prefix != other.prefix {
            return Err(IpError::PrefixMismatch {
                left: self.prefix,
                right: other.prefix,
            });
        }
        if !self.is_adjacent(other)? || !self.is_sibling_of(other) {
            return Err(IpError::NotAdjacent {
                left: self.to_text(),
                right: other.to_text(),
            });
        }
        Ok(Subnet::aligned(self.base.min(other.base), self.prefix - 1))
    }

    /// The enclosing subnet one bit shorter, or `None` for `/0`.
    pub fn supernet(&self) -> Option<Subnet> {
        let prefix = self.prefix.checked_sub(1)?;
        Some(Subnet::aligned(self.base, prefix))
    }

    /// Equal-size pieces of length `new_prefix_length` covering this subnet,
    /// ascending. Lazy, since `::/0` split to `/128` has 2^128 pieces.
    pub fn split(&self, new_prefix_length: u8) -> Result<SubnetSplit> {
        if new_prefix_length < self.prefix || new_prefix_length > self.bit_length() {
            return Err(IpError::Range(format!(
                "cannot split {self} into /{new_prefix_length}"
            )));
        }
        let family = self.family();
        let host_bits = u32::from(self.bit_length() - new_prefix_length);
        Ok(SubnetSplit {
            family,
            prefix: new_prefix_length,
            step: 1u128.checked_shl(host_bits).unwrap_or(0),
            next: Some(self.base.bits()),
            last: self.last_bits() & family.netmask(new_prefix_length),
        })
    }

    /// Remove `other` from this subnet, returning the minimal CIDR cover of
    /// what is left: empty if `other` covers this subnet, `[self]` if they
    /// do not overlap.
    pub fn subtract(&self, other: &Subnet) -> Result<Vec<Subnet>> {
        IpError::family_check(self.family(), other.family())?;
        if other.contains_subnet(self) {
            return Ok(Vec::new());
        }
        if !self.contains_subnet(other) {
            return Ok(vec![*self]);
        }
        Ok(self.carve(other))
    }

    /// What is left of this subnet around `inner`, which it must contain.
    pub(crate) fn carve(&self, inner: &Subnet) -> Vec<Subnet> {
        debug_assert!(self.contains_subnet(inner));
        let family = self.family();
        let mut pieces = Vec::new();
        if inner.base.bits() > self.base.bits() {
            pieces.extend(decompose(family, self.base.bits(), inner.base.bits() - 1));
        }
        if inner.last_bits() < self.last_bits() {
            pieces.extend(decompose(family, inner.last_bits() + 1, self.last_bits()));
        }
        log::trace!("{self} - {inner} = {} piece(s)", pieces.len());
        pieces
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}

impl FromStr for Subnet {
    type Err = IpError;

    fn from_str(s: &str) -> Result<Subnet> {
        Subnet::from_text(s)
    }
}

impl Serialize for Subnet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Subnet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Subnet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Subnet::from_text(&s).map_err(de::Error::custom)
    }
}

/// Iterator returned by [`Subnet::addresses`].
#[derive(Debug, Clone)]
pub struct SubnetAddresses {
    family: IpFamily,
    next: Option<u128>,
    last: u128,
}

impl Iterator for SubnetAddresses {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else {
            Some(current + 1)
        };
        Some(Address::with_bits(self.family, current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(next) => match usize::try_from(self.last - next) {
                Ok(remaining) => (remaining.saturating_add(1), remaining.checked_add(1)),
                Err(_) => (usize::MAX, None),
            },
        }
    }
}

impl FusedIterator for SubnetAddresses {}

/// Iterator returned by [`Subnet::split`].
#[derive(Debug, Clone)]
pub struct SubnetSplit {
    family: IpFamily,
    prefix: u8,
    step: u128,
    next: Option<u128>,
    last: u128,
}

impl Iterator for SubnetSplit {
    type Item = Subnet;

    fn next(&mut self) -> Option<Subnet> {
        let current = self.next?;
        self.next = if current == self.last {
            None
        } else {
            Some(current + self.step)
        };
        Some(Subnet {
            base: Address::with_bits(self.family, current),
            prefix: self.prefix,
        })
    }
}

impl FusedIterator for SubnetSplit {}

/// Sum of subnet sizes as a big integer.
pub(crate) fn total_size<'a, I: IntoIterator<Item = &'a Subnet>>(subnets: I) -> BigUint {
    subnets
        .into_iter()
        .fold(BigUint::zero(), |acc, s| acc + s.size())
}
