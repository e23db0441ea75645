use std::fmt;

use super::*;

/// Set of agents, stored as a bitmask over agent ids.
///
/// Equality and hashing only depend on membership, never on the order in
/// which agents were added.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coalition(u64);

impl Coalition {
    pub const fn empty() -> Self {
        Coalition(0)
    }

    pub fn from_bits(bits: u64) -> Self {
        Coalition(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn singleton(ag: AgentId) -> Self {
        Self::empty().with(ag)
    }

    /// The coalition of all agents `0..agent_count`.
    pub fn grand(agent_count: usize) -> Self {
        debug_assert!(agent_count <= COALITION_CAPACITY, "Agent count out of range.");
        Coalition((1u64 << agent_count) - 1)
    }

    pub fn contains(self, ag: AgentId) -> bool {
        ag < COALITION_CAPACITY && self.0 & (1 << ag) != 0
    }

    /// Returns a copy of the coalition with `ag` added.
    pub fn with(self, ag: AgentId) -> Self {
        debug_assert!(ag < COALITION_CAPACITY, "Agent number out of range.");
        Coalition(self.0 | (1 << ag))
    }

    /// Returns a copy of the coalition with `ag` removed.
    pub fn without(self, ag: AgentId) -> Self {
        debug_assert!(ag < COALITION_CAPACITY, "Agent number out of range.");
        Coalition(self.0 & !(1 << ag))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_subset_of(self, other: Coalition) -> bool {
        self.0 & !other.0 == 0
    }

    /// Members in increasing id order.
    pub fn members(self) -> Members {
        Members(self.0)
    }

    /// All `2^agent_count` coalitions of agents `0..agent_count`, in bitmask order.
    pub fn all(agent_count: usize) -> PowerSet {
        PowerSet::new(agent_count)
    }

    /// Human readable label: sorted member names joined by `+`, `∅` when empty.
    pub fn label<S: AsRef<str>>(self, name: impl Fn(AgentId) -> S) -> String {
        if self.is_empty() {
            return "∅".to_string();
        }
        let mut names = self.members().map(|ag| name(ag).as_ref().to_string()).collect::<Vec<_>>();
        names.sort();
        names.join("+")
    }
}

impl FromIterator<AgentId> for Coalition {
    fn from_iter<T: IntoIterator<Item = AgentId>>(iter: T) -> Self {
        iter.into_iter().fold(Coalition::empty(), Coalition::with)
    }
}

impl fmt::Debug for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members()).finish()
    }
}

impl fmt::Display for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, ag) in self.members().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{ag}")?;
        }
        write!(f, "}}")
    }
}

impl serde::Serialize for Coalition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.members())
    }
}

impl<'de> serde::Deserialize<'de> for Coalition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let members = Vec::<AgentId>::deserialize(deserializer)?;
        if let Some(&ag) = members.iter().find(|&&ag| ag >= COALITION_CAPACITY) {
            return Err(serde::de::Error::custom(format!("agent id {ag} out of range")));
        }
        Ok(members.into_iter().collect())
    }
}

/// Iterator over the members of a coalition.
#[derive(Clone, Debug)]
pub struct Members(u64);

impl Iterator for Members {
    type Item = AgentId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let ag = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(ag)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Members {}

/// Bitmask sweep `0..2^n` over the subsets of `n` agents.
#[derive(Clone, Debug)]
pub struct PowerSet {
    next: u64,
    end: u64,
}

impl PowerSet {
    pub fn new(agent_count: usize) -> Self {
        debug_assert!(agent_count <= COALITION_CAPACITY, "Agent count out of range.");
        PowerSet {
            next: 0,
            end: 1u64 << agent_count,
        }
    }
}

impl Iterator for PowerSet {
    type Item = Coalition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.end {
            return None;
        }
        let co = Coalition(self.next);
        self.next += 1;
        Some(co)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for PowerSet {}
