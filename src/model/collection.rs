//! The set of entries in a vault, with monotonic id assignment.

use super::entry::Entry;
use crate::errors::{Result, S7nError};

/// Owns entries and hands out ids.
///
/// Ids start at 1 and only grow; an id freed by deletion is never handed
/// out again by the same collection.
#[derive(Debug, Clone, Default)]
pub struct EntryCollection {
    entries: Vec<Entry>,
    max_id: i64,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries in order, assigning each a fresh id. Returns the ids.
    pub fn add_entries<I>(&mut self, entries: I) -> Vec<i64>
    where
        I: IntoIterator<Item = Entry>,
    {
        entries.into_iter().map(|entry| self.add(entry)).collect()
    }

    /// Add one entry with the next id.
    pub fn add(&mut self, mut entry: Entry) -> i64 {
        self.max_id += 1;
        entry.assign_id(self.max_id);
        self.entries.push(entry);
        self.max_id
    }

    /// Remove every entry whose id is listed, returning them in collection
    /// order. Unknown ids are ignored.
    pub fn delete_entries(&mut self, ids: &[i64]) -> Vec<Entry> {
        let (removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.id().is_some_and(|id| ids.contains(&id)));
        self.entries = kept;
        removed
    }

    /// Remove a single entry by id.
    pub fn delete(&mut self, id: i64) -> Result<Entry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id() == Some(id))
            .ok_or(S7nError::NoSuchEntry(id))?;
        Ok(self.entries.remove(pos))
    }

    /// Move `other`'s entries in, giving them fresh ids.
    pub fn merge(&mut self, other: EntryCollection) -> Vec<i64> {
        self.add_entries(other.entries)
    }

    pub fn find(&self, id: i64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == Some(id))
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id() == Some(id))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest id ever assigned (0 when none).
    pub fn max_id(&self) -> i64 {
        self.max_id
    }
}
