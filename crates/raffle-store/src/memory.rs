//! In-memory state store

use crate::StoreError;
use raffle_domain::{LotteryState, SaveOutcome, StateStore, Version, Versioned};
use std::sync::{Arc, Mutex};

/// In-memory implementation of StateStore
///
/// Clones are handles onto the same record, which makes it easy to simulate
/// several independent writers racing for one state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    cell: Arc<Mutex<Option<Versioned<LotteryState>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `state` at the first version
    pub fn with_state(state: LotteryState) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(Versioned {
                value: state,
                version: Version::FIRST,
            }))),
        }
    }
}

impl StateStore for MemoryStore {
    type Error = StoreError;

    fn load(&self) -> Result<Option<Versioned<LotteryState>>, Self::Error> {
        let cell = self
            .cell
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(cell.clone())
    }

    fn save(&mut self, state: &LotteryState, expected: Option<Version>) -> Result<SaveOutcome, Self::Error> {
        let mut cell = self
            .cell
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;

        let current = cell.as_ref().map(|v| v.version);
        if current != expected {
            return Ok(SaveOutcome::Conflict);
        }

        let version = current.map_or(Version::FIRST, |v| v.next());
        *cell = Some(Versioned {
            value: state.clone(),
            version,
        });

        Ok(SaveOutcome::Saved(version))
    }
}
