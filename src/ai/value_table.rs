use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::state_key::StateKey;
use crate::error::TableError;

/// One state's row as written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    key: StateKey,
    actions: BTreeMap<usize, f64>,
}

/// Mapping from (state key, action) to an estimated value.
///
/// Reads never insert: a pair that was never written is worth 0.0. Rows are
/// created on the first write and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnedValueTable {
    entries: HashMap<StateKey, HashMap<usize, f64>>,
}

impl LearnedValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StateKey, action: usize) -> f64 {
        self.entries
            .get(key)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Mutable estimate for (key, action), zero-initialized on first access
    pub fn value_mut(&mut self, key: &StateKey, action: usize) -> &mut f64 {
        self.entries
            .entry(*key)
            .or_default()
            .entry(action)
            .or_insert(0.0)
    }

    pub fn set(&mut self, key: &StateKey, action: usize, value: f64) {
        *self.value_mut(key, action) = value;
    }

    /// Highest recorded estimate for `key`, or 0.0 when nothing is recorded
    pub fn max_value(&self, key: &StateKey) -> f64 {
        self.entries
            .get(key)
            .and_then(|actions| actions.values().copied().reduce(f64::max))
            .unwrap_or(0.0)
    }

    pub fn contains_state(&self, key: &StateKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn num_states(&self) -> usize {
        self.entries.len()
    }

    pub fn num_entries(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        let mut records: Vec<TableRecord> = self
            .entries
            .iter()
            .map(|(key, actions)| TableRecord {
                key: *key,
                actions: actions.iter().map(|(&a, &v)| (a, v)).collect(),
            })
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(serde_json::to_string(&records)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let records: Vec<TableRecord> = serde_json::from_str(json)?;
        let entries = records
            .into_iter()
            .map(|record| (record.key, record.actions.into_iter().collect()))
            .collect();
        Ok(LearnedValueTable { entries })
    }

    /// Write the whole table to `path`, replacing any previous file in one
    /// rename so readers never observe a partial table.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let io_err = |source| TableError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, self.to_json()?).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let json = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, Player};

    fn key(side: Player) -> StateKey {
        StateKey::from_state(&GameState::initial(), side)
    }

    #[test]
    fn test_unseen_defaults_to_zero() {
        let table = LearnedValueTable::new();
        assert_eq!(table.get(&key(Player::Black), 19), 0.0);
        assert_eq!(table.max_value(&key(Player::Black)), 0.0);
        assert!(!table.contains_state(&key(Player::Black)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_value_mut_creates_entry() {
        let mut table = LearnedValueTable::new();
        *table.value_mut(&key(Player::Black), 19) += 0.5;
        assert!(table.contains_state(&key(Player::Black)));
        assert_eq!(table.get(&key(Player::Black), 19), 0.5);
        assert_eq!(table.num_states(), 1);
        assert_eq!(table.num_entries(), 1);
    }

    #[test]
    fn test_max_value_over_recorded_actions() {
        let mut table = LearnedValueTable::new();
        let k = key(Player::Black);
        table.set(&k, 19, -0.4);
        table.set(&k, 26, -0.1);
        // All recorded values are negative; unrecorded actions do not count.
        assert!((table.max_value(&k) + 0.1).abs() < 1e-12);
        table.set(&k, 37, 0.7);
        assert!((table.max_value(&k) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("q_table.json");

        let mut table = LearnedValueTable::new();
        table.set(&key(Player::Black), 19, 0.25);
        table.set(&key(Player::Black), 44, -1.0);
        table.set(&key(Player::White), 20, 0.75);
        table.save(&path).unwrap();

        assert!(path.exists());
        let loaded = LearnedValueTable::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.get(&key(Player::White), 20), 0.75);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LearnedValueTable::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }), "got: {err}");
    }

    #[test]
    fn test_load_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");
        std::fs::write(&path, "{ not a table").unwrap();
        let err = LearnedValueTable::load(&path).unwrap_err();
        assert!(matches!(err, TableError::Json(_)), "got: {err}");
    }
}
