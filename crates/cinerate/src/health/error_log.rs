//! Bounded history of backend error log entries.

use std::collections::HashSet;

use crate::models::ErrorLogEntry;

/// Merged error log, oldest entry first.
///
/// Entries merge by id and a resolved entry never becomes unresolved again.
/// When the history is over capacity the oldest resolved entry is evicted
/// first, then the oldest entry overall. An evicted id is not re-admitted
/// while the backend keeps reporting it.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHistory {
    capacity: usize,
    entries: Vec<ErrorLogEntry>,
    evicted: HashSet<String>,
}

impl ErrorHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
            evicted: HashSet::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ErrorLogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn resolved(&self) -> impl Iterator<Item = &ErrorLogEntry> {
        self.entries.iter().filter(|entry| entry.resolved)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ErrorLogEntry> {
        self.entries.iter().filter(|entry| !entry.resolved)
    }

    /// Merges fetched entries and returns how many new ones were kept.
    ///
    /// `incoming` is expected to be the backend's full log: evicted ids it no
    /// longer reports are forgotten.
    pub fn merge(&mut self, incoming: Vec<ErrorLogEntry>) -> usize {
        let reported: HashSet<String> = incoming.iter().map(|entry| entry.id.clone()).collect();
        let mut new_ids = HashSet::new();
        for entry in incoming {
            if self.evicted.contains(&entry.id) {
                continue;
            }
            match self.entries.iter_mut().find(|known| known.id == entry.id) {
                Some(known) => {
                    let resolved = known.resolved || entry.resolved;
                    *known = entry;
                    known.resolved = resolved;
                }
                None => {
                    new_ids.insert(entry.id.clone());
                    self.entries.push(entry);
                }
            }
        }

        self.entries
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        self.evict();
        self.evicted.retain(|id| reported.contains(id));

        self.entries
            .iter()
            .filter(|entry| new_ids.contains(&entry.id))
            .count()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let index = self
                .entries
                .iter()
                .position(|entry| entry.resolved)
                .unwrap_or(0);
            let removed = self.entries.remove(index);
            self.evicted.insert(removed.id);
        }
    }
}
