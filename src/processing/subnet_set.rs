//! Normalized set of subnets.
//!
//! After every mutation the members are re-normalized: no member overlaps
//! another and no two sibling members are left unmerged.

use crate::models::subnet::total_size;
use crate::models::{Address, Subnet};
use itertools::Itertools;
use num_bigint::BigUint;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

/// A set of non-overlapping subnets, kept in minimal form.
///
/// Members are ordered by family, then prefix length descending, then base
/// address. The order is stable for equal contents but is otherwise only an
/// implementation detail.
///
/// Not synchronised; wrap in a lock to share between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetSet {
    members: Vec<Subnet>,
}

fn sort_key(s: &Subnet) -> (u8, Reverse<u8>, Address) {
    (s.bit_length(), Reverse(s.prefix_length()), s.base_address())
}

impl SubnetSet {
    pub fn new() -> SubnetSet {
        SubnetSet {
            members: Vec::new(),
        }
    }

    /// Add a subnet. Returns `false` when it was already covered.
    ///
    /// # Examples
    /// ```
    /// use ip_subnet_set::{Subnet, SubnetSet};
    /// let mut set = SubnetSet::new();
    /// set.add("192.0.2.0/25".parse().unwrap());
    /// set.add("192.0.2.128/25".parse().unwrap());
    /// assert_eq!(set.members(), vec!["192.0.2.0/24".parse::<Subnet>().unwrap()]);
    /// ```
    pub fn add(&mut self, subnet: Subnet) -> bool {
        let changed = self.insert(subnet);
        if changed {
            self.normalize();
        }
        changed
    }

    /// Add a single host (`/32` or `/128`).
    pub fn add_address(&mut self, address: Address) -> bool {
        self.add(Subnet::host(address))
    }

    /// Union `other` into this set. Returns `false` when every member of
    /// `other` was already covered.
    pub fn add_set(&mut self, other: &SubnetSet) -> bool {
        let before = self.size();
        self.members.extend_from_slice(&other.members);
        self.normalize();
        self.size() != before
    }

    /// Insert without normalizing. Members covered by `subnet` are superseded.
    fn insert(&mut self, subnet: Subnet) -> bool {
        if self.contains_subnet(&subnet) {
            log::trace!("{subnet} already covered");
            return false;
        }
        let before = self.members.len();
        self.members.retain(|m| !subnet.contains_subnet(m));
        let superseded = before - self.members.len();
        if superseded > 0 {
            log::debug!("{subnet} supersedes {superseded} member(s)");
        } else {
            log::debug!("add {subnet}");
        }
        self.members.push(subnet);
        true
    }

    /// Remove a subnet that equals or lies inside one member.
    ///
    /// A subnet that only partly overlaps the set, or spans several
    /// members, is treated as absent and nothing changes.
    pub fn remove(&mut self, subnet: &Subnet) -> bool {
        if let Some(i) = self.members.iter().position(|m| m == subnet) {
            log::debug!("remove {subnet}");
            self.members.remove(i);
            return true;
        }
        let Some(i) = self.members.iter().position(|m| m.contains_subnet(subnet)) else {
            log::trace!("{subnet} not in set");
            return false;
        };
        let member = self.members.swap_remove(i);
        let pieces = member.carve(subnet);
        log::debug!("carve {subnet} out of {member}: {} piece(s)", pieces.len());
        self.members.extend(pieces);
        self.normalize();
        true
    }

    /// Remove a single host (`/32` or `/128`).
    pub fn remove_address(&mut self, address: &Address) -> bool {
        self.remove(&Subnet::host(*address))
    }

    /// Drop covered members, then merge siblings one prefix level at a time,
    /// longest prefix first. A merged parent lands on the next level down,
    /// so cascades collapse without rescanning.
    fn normalize(&mut self) {
        self.members.sort_unstable();
        let mut levels: BTreeMap<(u8, u8), Vec<Subnet>> = BTreeMap::new();
        let mut outer: Option<Subnet> = None;
        for subnet in self.members.drain(..) {
            // a covering block sorts before everything it covers
            if outer.is_some_and(|o| o.contains_subnet(&subnet)) {
                log::trace!("{subnet} already covered");
                continue;
            }
            outer = Some(subnet);
            levels
                .entry((subnet.bit_length(), subnet.prefix_length()))
                .or_default()
                .push(subnet);
        }

        let mut merges = 0usize;
        while let Some((_, mut level)) = levels.pop_last() {
            level.sort_unstable();
            let mut pending = level.into_iter().peekable();
            while let Some(subnet) = pending.next() {
                let sibling = pending.peek().is_some_and(|next| subnet.can_merge(next));
                match subnet.supernet() {
                    Some(parent) if sibling => {
                        log::trace!("merge {subnet} + sibling -> {parent}");
                        pending.next();
                        levels
                            .entry((parent.bit_length(), parent.prefix_length()))
                            .or_default()
                            .push(parent);
                        merges += 1;
                    }
                    _ => self.members.push(subnet),
                }
            }
        }
        self.members.sort_by_key(sort_key);
        if merges > 0 {
            log::debug!("normalized with {merges} merge(s), {} member(s)", self.members.len());
        }
    }

    /// True iff one member covers `subnet`.
    pub fn contains_subnet(&self, subnet: &Subnet) -> bool {
        self.members.iter().any(|m| m.contains_subnet(subnet))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.members.iter().any(|m| m.contains(address))
    }

    /// Total number of addresses across all members.
    pub fn size(&self) -> BigUint {
        total_size(&self.members)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Snapshot of the current members.
    pub fn members(&self) -> Vec<Subnet> {
        self.members.clone()
    }

    /// Member subnets in order. Use [`addresses`](Self::addresses) to walk
    /// individual addresses.
    pub fn iter(&self) -> std::slice::Iter<'_, Subnet> {
        self.members.iter()
    }

    /// Lazy iterator over every address of every member, in member order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.members.iter().flat_map(Subnet::addresses)
    }
}

impl FromIterator<Subnet> for SubnetSet {
    fn from_iter<I: IntoIterator<Item = Subnet>>(iter: I) -> SubnetSet {
        let mut set = SubnetSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Subnet> for SubnetSet {
    fn extend<I: IntoIterator<Item = Subnet>>(&mut self, iter: I) {
        let before = self.members.len();
        self.members.extend(iter);
        if self.members.len() != before {
            self.normalize();
        }
    }
}

/// Iterating a set by reference yields its member subnets, not addresses;
/// see [`SubnetSet::addresses`] for those.
impl<'a> IntoIterator for &'a SubnetSet {
    type Item = &'a Subnet;
    type IntoIter = std::slice::Iter<'a, Subnet>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl fmt::Display for SubnetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.members.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn net(s: &str) -> Subnet {
        s.parse().unwrap()
    }

    fn texts(set: &SubnetSet) -> Vec<String> {
        set.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_halves_merge() {
        let mut set = SubnetSet::new();
        assert!(set.add(net("192.0.2.0/25")));
        assert!(set.add(net("192.0.2.128/25")));
        assert_eq!(texts(&set), vec!["192.0.2.0/24"]);
        assert_eq!(set.size(), BigUint::from(256u32));
    }

    #[test]
    fn test_cascading_merge() {
        let mut set = SubnetSet::new();
        for s in ["10.0.0.192/26", "10.0.0.0/26", "10.0.0.128/26", "10.0.0.64/26"] {
            set.add(net(s));
        }
        assert_eq!(texts(&set), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_many_hosts_collapse() {
        let set: SubnetSet = net("10.1.0.0/22")
            .split(32)
            .unwrap()
            .collect();
        assert_eq!(texts(&set), vec!["10.1.0.0/22"]);
    }

    #[test]
    fn test_unit_subnets_collapse_in_bulk() {
        let start = std::time::Instant::now();
        let set: SubnetSet = net("10.0.0.0/16").split(32).unwrap().collect();
        assert_eq!(texts(&set), vec!["10.0.0.0/16"]);

        let mut v6: SubnetSet = net("2001:db8::/112").split(128).unwrap().collect();
        assert_eq!(texts(&v6), vec!["2001:db8::/112"]);
        assert!(v6.add_set(&set));
        assert_eq!(v6.len(), 2);
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_bulk_insert_drops_covered() {
        let set: SubnetSet = [
            net("10.0.0.0/24"),
            net("10.0.0.0/8"),
            net("10.0.0.0/24"),
            net("10.200.0.0/16"),
            net("192.0.2.7/32"),
        ]
        .into_iter()
        .collect();
        assert_eq!(texts(&set), vec!["192.0.2.7/32", "10.0.0.0/8"]);
    }

    #[test]
    fn test_remove_carves_only_the_containing_member() {
        let mut set: SubnetSet = [net("10.0.0.0/24"), net("2001:db8::/64")].into_iter().collect();
        assert!(set.remove(&net("10.0.0.0/26")));
        assert_eq!(texts(&set), vec!["10.0.0.64/26", "10.0.0.128/25", "2001:db8::/64"]);
    }

    #[test]
    fn test_non_siblings_stay_apart() {
        let set: SubnetSet = [net("192.0.2.128/25"), net("192.0.3.0/25")].into_iter().collect();
        assert_eq!(texts(&set), vec!["192.0.2.128/25", "192.0.3.0/25"]);
    }

    #[test]
    fn test_add_covered_is_noop() {
        let mut set = SubnetSet::new();
        set.add(net("10.0.0.0/8"));
        assert!(!set.add(net("10.1.0.0/16")));
        assert!(!set.add(net("10.0.0.0/8")));
        assert!(!set.add_address("10.9.9.9".parse().unwrap()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_supersedes() {
        let mut set = SubnetSet::new();
        set.add(net("10.1.0.0/16"));
        set.add(net("10.2.3.0/24"));
        set.add(net("192.0.2.0/24"));
        assert!(set.add(net("10.0.0.0/8")));
        assert_eq!(texts(&set), vec!["192.0.2.0/24", "10.0.0.0/8"]);
    }

    #[test]
    fn test_remove_exact_and_carve() {
        let mut set = SubnetSet::new();
        set.add(net("192.0.2.0/24"));
        assert!(set.remove(&net("192.0.2.128/25")));
        assert_eq!(texts(&set), vec!["192.0.2.0/25"]);
        assert_eq!(set.size(), BigUint::from(128u32));

        assert!(set.remove(&net("192.0.2.0/25")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_absent_or_partial() {
        let mut set = SubnetSet::new();
        set.add(net("10.0.0.0/24"));
        assert!(!set.remove(&net("10.0.1.0/24")));
        // a wider subnet only overlaps the member, which is not a match
        assert!(!set.remove(&net("10.0.0.0/16")));
        assert!(!set.remove(&net("::/0")));
        assert_eq!(texts(&set), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_remove_address() {
        let mut set = SubnetSet::new();
        set.add(net("10.0.0.0/30"));
        assert!(set.remove_address(&"10.0.0.1".parse().unwrap()));
        assert_eq!(texts(&set), vec!["10.0.0.0/32", "10.0.0.2/31"]);
        assert!(!set.contains(&"10.0.0.1".parse().unwrap()));
        assert_eq!(set.addresses().count(), 3);
    }

    #[test]
    fn test_mixed_families() {
        let mut set = SubnetSet::new();
        set.add(net("2001:db8::/33"));
        set.add(net("10.0.0.0/8"));
        set.add(net("2001:db8:8000::/33"));
        assert_eq!(texts(&set), vec!["10.0.0.0/8", "2001:db8::/32"]);
        assert!(set.contains(&"2001:db8::1".parse().unwrap()));
        assert!(set.contains_subnet(&net("2001:db8:1::/48")));
        assert!(!set.contains(&"::a00:1".parse().unwrap()));
        assert_eq!(
            set.size(),
            BigUint::from(1u32 << 24) + (BigUint::from(1u32) << 96usize)
        );
    }

    #[test]
    fn test_add_set() {
        let mut a: SubnetSet = [net("10.0.0.0/25")].into_iter().collect();
        let b: SubnetSet = [net("10.0.0.128/25"), net("10.0.1.0/24")].into_iter().collect();
        assert!(a.add_set(&b));
        assert_eq!(texts(&a), vec!["10.0.0.0/23"]);
        assert!(!a.add_set(&b));
    }

    #[test]
    fn test_members_is_a_snapshot() {
        let mut set = SubnetSet::new();
        set.add(net("10.0.0.0/8"));
        let mut snapshot = set.members();
        snapshot.clear();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_addresses_in_member_order() {
        let set: SubnetSet = [net("10.0.0.8/31"), net("10.0.0.0/32")].into_iter().collect();
        let all: Vec<String> = set.addresses().map(|a| a.to_string()).collect();
        assert_eq!(all, vec!["10.0.0.0", "10.0.0.8", "10.0.0.9"]);
        assert_eq!(set.addresses().count(), 3);
    }

    #[test]
    fn test_display() {
        let set: SubnetSet = [net("10.0.0.0/8"), net("192.0.2.0/24")].into_iter().collect();
        assert_eq!(set.to_string(), "192.0.2.0/24, 10.0.0.0/8");
    }

    fn arb_subnet() -> impl Strategy<Value = Subnet> {
        // a narrow space makes overlaps and merges common
        (0u32..256, 24u8..=32).prop_map(|(low, len)| {
            Subnet::new(Address::v4(0x0A00_0000 | low), len).unwrap()
        })
    }

    fn assert_normalized(set: &SubnetSet) -> Result<(), TestCaseError> {
        let members = set.members();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {}", a, b);
                prop_assert!(!a.can_merge(b), "{} and {} left unmerged", a, b);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn adds_keep_set_normalized(subnets in prop::collection::vec(arb_subnet(), 0..24)) {
            let mut set = SubnetSet::new();
            for s in &subnets {
                set.add(*s);
                assert_normalized(&set)?;
                prop_assert_eq!(set.size(), total_size(&set.members()));
            }
            for s in &subnets {
                prop_assert!(set.contains_subnet(s));
            }
        }

        #[test]
        fn normal_form_is_order_independent(subnets in prop::collection::vec(arb_subnet(), 0..24)) {
            let forward: SubnetSet = subnets.iter().copied().collect();
            let backward: SubnetSet = subnets.iter().rev().copied().collect();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn add_then_remove_restores(
            subnets in prop::collection::vec(arb_subnet(), 0..12),
            extra in arb_subnet(),
        ) {
            let mut set: SubnetSet = subnets.into_iter().collect();
            prop_assume!(!set.contains_subnet(&extra));
            prop_assume!(!set.iter().any(|m| extra.overlaps(m)));
            let before = set.clone();
            prop_assert!(set.add(extra));
            prop_assert!(set.remove(&extra));
            prop_assert_eq!(set, before);
        }

        #[test]
        fn removes_keep_size_consistent(
            subnets in prop::collection::vec(arb_subnet(), 1..12),
            removals in prop::collection::vec(arb_subnet(), 0..12),
        ) {
            let mut set: SubnetSet = subnets.into_iter().collect();
            for r in &removals {
                let before = set.size();
                if set.remove(r) {
                    prop_assert_eq!(set.size() + r.size(), before);
                    prop_assert!(!set.iter().any(|m| m.overlaps(r)));
                }
                assert_normalized(&set)?;
            }
        }
    }
}
