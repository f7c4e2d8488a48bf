//! IP family tag and the per-family capabilities shared by addresses and subnets.
//!
//! All address arithmetic runs on a single `u128` representation; the family
//! only decides the bit width, the text format and the fixed-width layout.

use super::text;
use crate::error::Result;
use std::fmt;

/// Address family of an [`Address`](super::Address) or [`Subnet`](super::Subnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Number of bits in an address of this family (32 or 128).
    pub const fn bit_length(self) -> u8 {
        match self {
            IpFamily::V4 => 32,
            IpFamily::V6 => 128,
        }
    }

    /// Largest legal address value.
    pub const fn max_bits(self) -> u128 {
        match self {
            IpFamily::V4 => u32::MAX as u128,
            IpFamily::V6 => u128::MAX,
        }
    }

    /// Number of groups in the fixed-width binary form: 4 octets or 8 hextets.
    pub const fn fixed_width(self) -> usize {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 8,
        }
    }

    /// Largest value of one fixed-width group.
    pub(crate) const fn group_max(self) -> u16 {
        match self {
            IpFamily::V4 => u8::MAX as u16,
            IpFamily::V6 => u16::MAX,
        }
    }

    /// Bitmask with `len` leading one bits. `len` must not exceed [`bit_length`](Self::bit_length).
    pub fn netmask(self, len: u8) -> u128 {
        debug_assert!(len <= self.bit_length());
        self.max_bits() & !host_mask(u32::from(self.bit_length() - len))
    }

    /// Complement of [`netmask`](Self::netmask) within the family width.
    pub fn hostmask(self, len: u8) -> u128 {
        debug_assert!(len <= self.bit_length());
        host_mask(u32::from(self.bit_length() - len))
    }

    pub(crate) fn parse(self, s: &str) -> Result<u128> {
        match self {
            IpFamily::V4 => text::parse_v4(s).map(u128::from),
            IpFamily::V6 => text::parse_v6(s),
        }
    }

    pub(crate) fn render(self, bits: u128) -> String {
        match self {
            IpFamily::V4 => text::render_v4(bits as u32),
            IpFamily::V6 => text::render_v6(bits),
        }
    }

    /// Family implied by address text: colon-hex is IPv6, anything else IPv4.
    pub(crate) fn detect(s: &str) -> IpFamily {
        if s.contains(':') {
            IpFamily::V6
        } else {
            IpFamily::V4
        }
    }
}

/// Low `host_bits` bits set; saturates at the full 128 bits.
pub(crate) fn host_mask(host_bits: u32) -> u128 {
    if host_bits >= u128::BITS {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netmask_v4() {
        assert_eq!(IpFamily::V4.netmask(0), 0x0000_0000);
        assert_eq!(IpFamily::V4.netmask(8), 0xFF00_0000);
        assert_eq!(IpFamily::V4.netmask(24), 0xFFFF_FF00);
        assert_eq!(IpFamily::V4.netmask(32), 0xFFFF_FFFF);
    }

    #[test]
    fn test_netmask_v6() {
        assert_eq!(IpFamily::V6.netmask(0), 0);
        assert_eq!(IpFamily::V6.netmask(128), u128::MAX);
        assert_eq!(IpFamily::V6.netmask(64), u128::MAX << 64);
        assert_eq!(IpFamily::V6.hostmask(0), u128::MAX);
        assert_eq!(IpFamily::V6.hostmask(127), 1);
    }

    #[test]
    fn test_hostmask_is_complement() {
        for len in 0..=32 {
            let family = IpFamily::V4;
            assert_eq!(family.netmask(len) | family.hostmask(len), family.max_bits());
            assert_eq!(family.netmask(len) & family.hostmask(len), 0);
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(IpFamily::detect("10.0.0.1"), IpFamily::V4);
        assert_eq!(IpFamily::detect("::ffff:10.0.0.1"), IpFamily::V6);
    }
}
