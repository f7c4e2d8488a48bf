//! Family-tagged IP address value.
//!
//! [`Address`] wraps a single `u128` for both families so that subnet
//! arithmetic is written once. Construction validates the family range;
//! values are immutable afterwards.

use super::IpFamily;
use crate::error::{IpError, Result};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IPv4-mapped IPv6 prefix `::ffff:0:0/96`, shifted down by 32 bits.
const MAPPED_V4_PREFIX: u128 = 0xffff;

/// An IPv4 or IPv6 address.
///
/// Ordering compares family first, then the numeric value, so addresses of
/// one family sort numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    family: IpFamily,
    bits: u128,
}

impl Address {
    /// IPv4 address from its 32-bit value.
    pub const fn v4(bits: u32) -> Address {
        Address {
            family: IpFamily::V4,
            bits: bits as u128,
        }
    }

    /// IPv6 address from its 128-bit value.
    pub const fn v6(bits: u128) -> Address {
        Address {
            family: IpFamily::V6,
            bits,
        }
    }

    /// Caller guarantees `bits <= family.max_bits()`.
    pub(crate) fn with_bits(family: IpFamily, bits: u128) -> Address {
        debug_assert!(bits <= family.max_bits());
        Address { family, bits }
    }

    /// Address from an arbitrary integer, failing if it is outside
    /// `0..=2^bit_length - 1`.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::{Address, IpFamily};
    /// let a = Address::from_integer(0xC000_0201u32, IpFamily::V4).unwrap();
    /// assert_eq!(a.to_text(), "192.0.2.1");
    /// assert!(Address::from_integer(-1, IpFamily::V4).is_err());
    /// ```
    pub fn from_integer<N: Into<BigInt>>(n: N, family: IpFamily) -> Result<Address> {
        let n: BigInt = n.into();
        match n.to_u128() {
            Some(bits) if bits <= family.max_bits() => Ok(Address { family, bits }),
            _ => Err(IpError::Range(format!("{n} is not a valid {family} address"))),
        }
    }

    /// IPv4 address from exactly 4 octets.
    pub fn from_octets(octets: &[u8]) -> Result<Address> {
        Address::from_groups(IpFamily::V4, octets.iter().map(|&o| u128::from(o)))
    }

    /// IPv6 address from exactly 8 sixteen-bit groups.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::{Address, ErrorKind};
    /// let a = Address::from_hextets(&[0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]).unwrap();
    /// assert_eq!(a.to_text(), "2001:db8::1");
    /// let err = Address::from_hextets(&[0; 7]).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Length);
    /// ```
    pub fn from_hextets(hextets: &[u16]) -> Result<Address> {
        Address::from_groups(IpFamily::V6, hextets.iter().map(|&g| u128::from(g)))
    }

    fn from_groups<I>(family: IpFamily, groups: I) -> Result<Address>
    where
        I: ExactSizeIterator<Item = u128>,
    {
        if groups.len() != family.fixed_width() {
            return Err(IpError::Length {
                family,
                expected: family.fixed_width(),
                actual: groups.len(),
            });
        }
        let group_bits = u32::from(family.bit_length()) / family.fixed_width() as u32;
        let bits = groups.fold(0u128, |bits, group| (bits << group_bits) | group);
        Ok(Address { family, bits })
    }

    /// Fixed-width groups, inverse of [`from_octets`](Self::from_octets) and
    /// [`from_hextets`](Self::from_hextets).
    pub fn to_fixed_width_binary(&self) -> Vec<u16> {
        let width = self.family.fixed_width();
        let group_bits = u32::from(self.family.bit_length()) / width as u32;
        let group_mask = u128::from(self.family.group_max());
        (0..width)
            .rev()
            .map(|i| ((self.bits >> (group_bits * i as u32)) & group_mask) as u16)
            .collect()
    }

    /// Parse dotted-decimal or colon-hex text; a colon selects IPv6.
    pub fn from_text(s: &str) -> Result<Address> {
        let family = IpFamily::detect(s);
        let bits = family.parse(s)?;
        Ok(Address { family, bits })
    }

    /// Canonical text: dotted-decimal, or compressed lower-case colon-hex.
    pub fn to_text(&self) -> String {
        self.family.render(self.bits)
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn bit_length(&self) -> u8 {
        self.family.bit_length()
    }

    /// Address `delta` steps away from this one. Deltas may exceed 64 bits.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::Address;
    /// let a: Address = "10.0.0.255".parse().unwrap();
    /// assert_eq!(a.offset(1).unwrap().to_text(), "10.0.1.0");
    /// assert!(a.offset(-0x0A00_0100i64).is_err());
    /// ```
    pub fn offset<D: Into<BigInt>>(&self, delta: D) -> Result<Address> {
        let target = BigInt::from(self.bits) + delta.into();
        if target.sign() == Sign::Minus {
            return Err(IpError::Range(format!(
                "{self} offset to negative value {target}"
            )));
        }
        Address::from_integer(target, self.family)
    }

    /// True iff this is an IPv6 address inside `::ffff:0:0/96`.
    pub fn has_mapped_ipv4(&self) -> bool {
        self.family == IpFamily::V6 && self.bits >> 32 == MAPPED_V4_PREFIX
    }

    /// The IPv4 address carried in the low 32 bits of an IPv4-mapped IPv6 address.
    pub fn mapped_ipv4(&self) -> Result<Address> {
        if !self.has_mapped_ipv4() {
            return Err(IpError::NotMapped(self.to_text()));
        }
        Ok(Address::v4(self.bits as u32))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl FromStr for Address {
    type Err = IpError;

    fn from_str(s: &str) -> Result<Address> {
        Address::from_text(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_text(&s).map_err(de::Error::custom)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Address {
        Address::v4(u32::from(addr))
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Address {
        Address::v6(u128::from(addr))
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Address {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> IpAddr {
        match addr.family {
            IpFamily::V4 => IpAddr::V4(Ipv4Addr::from(addr.bits as u32)),
            IpFamily::V6 => IpAddr::V6(Ipv6Addr::from(addr.bits)),
        }
    }
}
