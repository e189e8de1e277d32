//! External collaborator contracts.
//!
//! The core never performs I/O itself: persistence and identity are
//! traits the surrounding server implements. An in-memory store backs
//! the tests.
//!
//! Adjudication is a pure, synchronous computation; the caller must
//! hold a per-game exclusive lock across load, mutate, and save so
//! that no two operations touch the same game concurrently.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::EngineError;

/// Key/value persistence of serialized game documents.
pub trait GameStore {
    fn load(&self, game_id: u64) -> Result<Option<Value>, EngineError>;
    fn save(&mut self, game_id: u64, document: Value) -> Result<(), EngineError>;
    fn list_active(&self) -> Result<Vec<u64>, EngineError>;
    fn mark_deleted(&mut self, game_id: u64) -> Result<(), EngineError>;
}

/// Identity lookup provided by the surrounding platform.
pub trait UserDirectory {
    fn user_has_app_permission(&self, username: &str, app: &str) -> bool;
    fn user_data(&self, username: &str) -> Option<UserData>;
}

/// Directory record for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub firstname: String,
    pub lastname: String,
    pub user_type: String,
    pub email: String,
}

/// In-memory [`GameStore`] used by tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: BTreeMap<u64, Value>,
    deleted: BTreeSet<u64>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, game_id: u64) -> Result<Option<Value>, EngineError> {
        Ok(self.games.get(&game_id).cloned())
    }

    fn save(&mut self, game_id: u64, document: Value) -> Result<(), EngineError> {
        self.games.insert(game_id, document);
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<u64>, EngineError> {
        Ok(self
            .games
            .keys()
            .filter(|id| !self.deleted.contains(id))
            .copied()
            .collect())
    }

    fn mark_deleted(&mut self, game_id: u64) -> Result<(), EngineError> {
        if !self.games.contains_key(&game_id) {
            return Err(EngineError::NotFound(format!("game {}", game_id)));
        }
        self.deleted.insert(game_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_round_trip() {
        let mut store = MemoryStore::new();
        let doc = serde_json::json!({"id": 7, "name": "x"});
        store.save(7, doc.clone()).unwrap();
        assert_eq!(store.load(7).unwrap(), Some(doc));
        assert_eq!(store.load(8).unwrap(), None);
    }

    #[test]
    fn deleted_games_leave_the_active_list() {
        let mut store = MemoryStore::new();
        store.save(1, serde_json::json!({})).unwrap();
        store.save(2, serde_json::json!({})).unwrap();
        assert_eq!(store.list_active().unwrap(), vec![1, 2]);
        store.mark_deleted(1).unwrap();
        assert_eq!(store.list_active().unwrap(), vec![2]);
        assert!(store.mark_deleted(9).is_err());
    }
}
