//! The six-slot resource counter shared by the wire protocol and the engine.

use serde::{Deserialize, Serialize};

/// One of the six resource kinds a player's hand or the bank can hold.
/// `Unknown` stands in for a resource whose concrete type has been hidden
/// from a recipient (see the hidden-info rule in `DESIGN.md`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum ResourceType {
    Clay,
    Ore,
    Sheep,
    Wheat,
    Wood,
    Unknown,
}

pub const RESOURCE_TYPES: [ResourceType; 5] = [
    ResourceType::Clay,
    ResourceType::Ore,
    ResourceType::Sheep,
    ResourceType::Wheat,
    ResourceType::Wood,
];

fn index_of(rt: ResourceType) -> usize {
    match rt {
        ResourceType::Clay => 0,
        ResourceType::Ore => 1,
        ResourceType::Sheep => 2,
        ResourceType::Wheat => 3,
        ResourceType::Wood => 4,
        ResourceType::Unknown => 5,
    }
}

/// A nonnegative counter over the six resource slots (§3 "Resource set").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    counts: [i32; 6],
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(clay: i32, ore: i32, sheep: i32, wheat: i32, wood: i32) -> Self {
        let mut set = Self::default();
        set.counts[0] = clay;
        set.counts[1] = ore;
        set.counts[2] = sheep;
        set.counts[3] = wheat;
        set.counts[4] = wood;
        set
    }

    pub fn single(rt: ResourceType, amount: i32) -> Self {
        let mut set = Self::default();
        set.counts[index_of(rt)] = amount;
        set
    }

    pub fn get(&self, rt: ResourceType) -> i32 {
        self.counts[index_of(rt)]
    }

    pub fn set(&mut self, rt: ResourceType, amount: i32) {
        self.counts[index_of(rt)] = amount;
    }

    /// Sum of the five known resource kinds (excludes `Unknown`).
    pub fn known_total(&self) -> i32 {
        self.counts[0..5].iter().sum()
    }

    /// Sum of every slot, including `Unknown`.
    pub fn total(&self) -> i32 {
        self.counts.iter().sum()
    }

    pub fn add(&mut self, other: &ResourceSet) {
        for i in 0..6 {
            self.counts[i] += other.counts[i];
        }
    }

    /// True if every known slot of `other` is covered by `self`.
    pub fn contains(&self, other: &ResourceSet) -> bool {
        RESOURCE_TYPES
            .iter()
            .all(|&rt| self.get(rt) >= other.get(rt))
    }

    /// Subtracts `other` from `self`. When a slot would go negative the
    /// deficit is drained from `Unknown` instead (§3 "subtract-with-unknown
    /// -fallback"): used when we know a player lost N resources of a known
    /// type but their tracked hand does not have that many because some of
    /// their holdings were recorded as `Unknown`.
    pub fn subtract_with_unknown_fallback(&mut self, other: &ResourceSet) {
        for &rt in RESOURCE_TYPES.iter() {
            let idx = index_of(rt);
            let have = self.counts[idx];
            let want = other.counts[idx];
            if have >= want {
                self.counts[idx] = have - want;
            } else {
                let deficit = want - have;
                self.counts[idx] = 0;
                self.counts[5] = (self.counts[5] - deficit).max(0);
            }
        }
        self.counts[5] -= other.counts[5];
    }

    /// Strict subtraction, used once a legality check has already confirmed
    /// `self.contains(other)`.
    pub fn subtract(&mut self, other: &ResourceSet) {
        for i in 0..6 {
            self.counts[i] -= other.counts[i];
        }
    }

    /// Redacts every known slot into `Unknown`, keeping only the total
    /// count observable. Used by the broadcaster for non-privileged
    /// recipients of a hidden-information event.
    pub fn redacted(&self) -> ResourceSet {
        ResourceSet::single(ResourceType::Unknown, self.known_total() + self.counts[5])
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_with_unknown_fallback_drains_unknown_on_deficit() {
        let mut hand = ResourceSet::of(1, 0, 0, 0, 0);
        hand.set(ResourceType::Unknown, 3);
        hand.subtract_with_unknown_fallback(&ResourceSet::of(2, 0, 0, 0, 0));
        assert_eq!(hand.get(ResourceType::Clay), 0);
        assert_eq!(hand.get(ResourceType::Unknown), 2);
    }

    #[test]
    fn redacted_preserves_total() {
        let hand = ResourceSet::of(2, 1, 0, 3, 0);
        let total = hand.total();
        assert_eq!(hand.redacted().total(), total);
    }

    #[test]
    fn contains_checks_every_known_slot() {
        let bank = ResourceSet::of(4, 4, 4, 4, 4);
        let cost = ResourceSet::of(1, 1, 1, 1, 0);
        assert!(bank.contains(&cost));
        assert!(!bank.contains(&ResourceSet::of(5, 0, 0, 0, 0)));
    }
}
