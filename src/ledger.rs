use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::*;

/// One realised coalition and the coins it found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub members: Coalition,
    pub coins: Value,
}

/// Coins actually found by the coalitions that took a turn.
///
/// Coalitions that never played are worth nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    coins: HashMap<Coalition, Value>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coins` to what `coalition` has found so far, saturating at
    /// `Value::MAX`. The empty coalition never plays.
    pub fn record(&mut self, coalition: Coalition, coins: Value) {
        debug_assert!(!coalition.is_empty(), "The empty coalition cannot take a turn.");
        if coalition.is_empty() {
            return;
        }
        let found = self.coins.entry(coalition).or_insert(0);
        *found = found.saturating_add(coins);
    }

    pub fn get(&self, coalition: Coalition) -> Value {
        self.coins.get(&coalition).copied().unwrap_or(0)
    }

    /// Number of distinct coalitions recorded.
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Recorded entries, sorted by coalition.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        let mut entries = self
            .coins
            .iter()
            .map(|(&members, &coins)| LedgerEntry { members, coins })
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| e.members);
        entries
    }

    /// Total coins over all recorded coalitions, saturating at `Value::MAX`.
    pub fn total(&self) -> Value {
        self.coins.values().fold(0, |acc, &c| acc.saturating_add(c))
    }

    /// Largest agent id mentioned in the ledger, if any.
    pub fn max_agent(&self) -> Option<AgentId> {
        self.coins.keys().flat_map(|co| co.members()).max()
    }

    /// Parses a JSON array of `{ "members": [..], "coins": n }` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<LedgerEntry> = serde_json::from_str(json)?;
        Ok(entries.into_iter().collect())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

impl FromIterator<LedgerEntry> for Ledger {
    fn from_iter<T: IntoIterator<Item = LedgerEntry>>(iter: T) -> Self {
        let mut ledger = Ledger::new();
        for entry in iter {
            if !entry.members.is_empty() {
                ledger.record(entry.members, entry.coins);
            }
        }
        ledger
    }
}

impl CoalitionValue for Ledger {
    fn value(&self, coalition: Coalition) -> Value {
        self.get(coalition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn co(members: &[AgentId]) -> Coalition {
        members.iter().copied().collect()
    }

    #[test]
    fn test_record() {
        let mut ledger = Ledger::new();
        ledger.record(co(&[0, 2]), 40);
        ledger.record(co(&[2, 0]), 20);
        ledger.record(co(&[1]), 0);
        assert_eq!(ledger.get(co(&[0, 2])), 60);
        assert_eq!(ledger.get(co(&[1])), 0);
        assert_eq!(ledger.get(co(&[0])), 0);
        assert_eq!(ledger.value(Coalition::empty()), 0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), 60);
        assert_eq!(ledger.max_agent(), Some(2));
        assert_eq!(ledger.covered_agents(), None);
    }

    #[test]
    fn test_repeated_entries_saturate() {
        let json = format!(r#"[{{"members": [0], "coins": {max}}}, {{"members": [0], "coins": 7}}, {{"members": [1], "coins": 3}}]"#, max = u64::MAX);
        let ledger = Ledger::from_json_str(&json).unwrap();
        assert_eq!(ledger.get(co(&[0])), Value::MAX);
        assert_eq!(ledger.get(co(&[1])), 3);
        assert_eq!(ledger.total(), Value::MAX);
    }

    #[test]
    fn test_json() {
        let ledger = Ledger::from_json_str(
            r#"[{"members": [1], "coins": 20}, {"members": [0, 1], "coins": 80}, {"members": [1], "coins": 40}]"#,
        )
        .unwrap();
        assert_eq!(
            ledger.entries(),
            [
                LedgerEntry { members: co(&[1]), coins: 60 },
                LedgerEntry { members: co(&[0, 1]), coins: 80 },
            ]
        );
        assert!(Ledger::from_json_str("{}").is_err());
        assert!(Ledger::from_json_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_skips_empty_coalition() {
        let ledger = Ledger::from_json_str(r#"[{"members": [], "coins": 5}]"#).unwrap();
        assert!(ledger.is_empty());
    }
}
