//! Range to CIDR decomposition.
//!
//! Greedy cover: from the current position take the largest block that is
//! both aligned to it and does not run past the end of the range.

use super::family::host_mask;
use super::{Address, IpFamily, Subnet};
use crate::error::{IpError, Result};

/// Minimal ordered list of CIDR blocks exactly covering `start..=end`.
///
/// # Examples
/// ```
/// use ip_subnet_set::{range_to_subnets, Address};
/// let start: Address = "10.0.0.1".parse().unwrap();
/// let end: Address = "10.0.0.6".parse().unwrap();
/// let blocks: Vec<String> = range_to_subnets(start, end)
///     .unwrap()
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// assert_eq!(blocks, ["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]);
/// ```
pub fn range_to_subnets(start: Address, end: Address) -> Result<Vec<Subnet>> {
    IpError::family_check(start.family(), end.family())?;
    if start > end {
        return Err(IpError::Range(format!("range start {start} is after end {end}")));
    }
    Ok(decompose(start.family(), start.bits(), end.bits()))
}

/// Caller guarantees `start <= end` and both fit the family.
pub(crate) fn decompose(family: IpFamily, start: u128, end: u128) -> Vec<Subnet> {
    let bit_length = u32::from(family.bit_length());
    let mut blocks = Vec::new();
    let mut cur = start;
    loop {
        let alignment = cur.trailing_zeros().min(bit_length);
        // floor(log2(end - cur + 1)); the count overflows only for the full IPv6 space
        let capacity = match (end - cur).checked_add(1) {
            Some(count) => u128::BITS - 1 - count.leading_zeros(),
            None => u128::BITS,
        };
        let host_bits = alignment.min(capacity);
        let prefix = (bit_length - host_bits) as u8;
        blocks.push(Subnet::aligned(Address::with_bits(family, cur), prefix));
        log::trace!("range block {}/{prefix}", Address::with_bits(family, cur));

        let last = cur | host_mask(host_bits);
        if last >= end {
            break;
        }
        cur = last + 1;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::subnet::total_size;
    use num_bigint::BigUint;
    use proptest::prelude::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_documentation_range() {
        let blocks = range_to_subnets(addr("192.0.2.0"), addr("198.51.100.255")).unwrap();
        assert_eq!(blocks.len(), 26);
        assert_eq!(blocks[0].to_text(), "192.0.2.0/23");
        assert_eq!(blocks[1].to_text(), "192.0.4.0/22");
        assert_eq!(blocks[15].to_text(), "193.0.0.0/8");
        assert_eq!(blocks[25].to_text(), "198.51.100.0/24");
    }

    #[test]
    fn test_single_address() {
        let blocks = range_to_subnets(addr("10.0.0.7"), addr("10.0.0.7")).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].to_text(), "10.0.0.7/32");
    }

    #[test]
    fn test_whole_space() {
        let v4 = range_to_subnets(addr("0.0.0.0"), addr("255.255.255.255")).unwrap();
        assert_eq!(v4.len(), 1);
        assert_eq!(v4[0].to_text(), "0.0.0.0/0");

        let v6 = range_to_subnets(Address::v6(0), Address::v6(u128::MAX)).unwrap();
        assert_eq!(v6.len(), 1);
        assert_eq!(v6[0].to_text(), "::/0");
    }

    #[test]
    fn test_top_of_space() {
        let blocks = range_to_subnets(addr("255.255.255.0"), addr("255.255.255.255")).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].to_text(), "255.255.255.0/24");

        let blocks = range_to_subnets(addr("ffff::1"), Address::v6(u128::MAX)).unwrap();
        assert_eq!(blocks.first().unwrap().to_text(), "ffff::1/128");
        assert_eq!(blocks.last().unwrap().to_text(), "ffff:8000::/17");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            range_to_subnets(addr("10.0.0.2"), addr("10.0.0.1"))
                .unwrap_err()
                .kind(),
            ErrorKind::Range
        );
        assert_eq!(
            range_to_subnets(addr("10.0.0.1"), addr("::1"))
                .unwrap_err()
                .kind(),
            ErrorKind::FamilyMismatch
        );
    }

    proptest! {
        #[test]
        fn blocks_cover_range_exactly(a in any::<u32>(), b in any::<u32>()) {
            let (lo, hi) = (a.min(b), a.max(b));
            let blocks = range_to_subnets(Address::v4(lo), Address::v4(hi)).unwrap();
            prop_assert_eq!(blocks[0].base_address(), Address::v4(lo));
            prop_assert_eq!(blocks.last().unwrap().last_address(), Address::v4(hi));
            prop_assert_eq!(total_size(&blocks), BigUint::from(hi - lo) + 1u32);
            for pair in blocks.windows(2) {
                prop_assert_eq!(pair[0].last_address().offset(1).unwrap(), pair[1].base_address());
                // minimal: no two neighbours could have been one block
                prop_assert!(!pair[0].can_merge(&pair[1]));
            }
        }
    }
}
