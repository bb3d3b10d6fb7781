use std::collections::HashMap;

use crate::{
    art::{params::GenerationParams, state::ArtState},
    error::{Result, StateError},
};

/// A stored artwork and the parameters it was made with
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub state: ArtState,
    pub params: GenerationParams,
    /// Seed the state was generated from, if it was generated in this session
    pub seed: Option<u64>,
}

/// Registry of the artworks of one session
///
/// Entries are addressed by sequential ids handed out on insertion; ids are never reused.
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    entries: HashMap<u64, SnapshotEntry>,
    next_id: u64,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry and return its id
    pub fn insert(&mut self, entry: SnapshotEntry) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn get(&self, id: u64) -> Result<&SnapshotEntry> {
        self.entries
            .get(&id)
            .ok_or_else(|| StateError::NotFound { id }.into())
    }

    /// Replace the entry stored under `id`
    pub fn replace(&mut self, id: u64, entry: SnapshotEntry) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(StateError::NotFound { id }.into()),
        }
    }

    pub fn remove(&mut self, id: u64) -> Result<SnapshotEntry> {
        self.entries
            .remove(&id)
            .ok_or_else(|| StateError::NotFound { id }.into())
    }

    /// Check if an id is registered
    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// All registered ids in ascending order
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
