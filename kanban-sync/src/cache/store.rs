//! The shared query cache

use super::entry::{CacheEntry, EntryStatus};
use super::key::CacheKey;
use crate::types::{EntityKind, MutationId};
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keyed views of authority state.
///
/// Safe to share between tasks behind an `Arc`. Invalidated keys are remembered
/// until drained so callers can decide what to refetch.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<CacheKey, CacheEntry>,
    invalidated: DashSet<CacheKey>,
    invalidations: AtomicUsize,
}

/// Entries captured before a speculative write, restorable as they were
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Vec<(CacheKey, Option<CacheEntry>)>,
}

impl Snapshot {
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// The captured value of a key, if it was cached at capture time
    pub fn value(&self, key: &CacheKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, entry)| entry.as_ref())
            .map(|entry| &entry.value)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    pub fn value(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store an authority response
    pub fn insert_confirmed(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, CacheEntry::confirmed(value));
    }

    /// Speculatively modify an existing entry on behalf of a mutation.
    ///
    /// Absent keys are left absent. Returns whether an entry was modified.
    pub fn update_if_present(
        &self,
        key: &CacheKey,
        mutation: &MutationId,
        apply: impl FnOnce(&mut Value),
    ) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                apply(&mut entry.value);
                entry.status = EntryStatus::Pending(mutation.clone());
                entry.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Capture the current state of `keys`, absent ones included
    pub fn snapshot(&self, keys: impl IntoIterator<Item = CacheKey>) -> Snapshot {
        let mut entries: Vec<(CacheKey, Option<CacheEntry>)> = Vec::new();
        for key in keys {
            if entries.iter().any(|(k, _)| *k == key) {
                continue;
            }
            let entry = self.get(&key);
            entries.push((key, entry));
        }
        Snapshot { entries }
    }

    /// Put captured entries back exactly as they were.
    ///
    /// Keys that were absent at capture time receive no write. An entry captured
    /// while pending on a mutation that `settled` reports as finished comes back
    /// `Stale` instead, since no one is left to resolve it; those keys are returned
    /// so they can be refetched.
    pub fn restore(
        &self,
        snapshot: Snapshot,
        settled: impl Fn(&MutationId) -> bool,
    ) -> Vec<CacheKey> {
        let mut orphaned = Vec::new();
        for (key, entry) in snapshot.entries {
            let Some(mut entry) = entry else {
                continue;
            };
            if let EntryStatus::Pending(mutation) = &entry.status {
                if settled(mutation) {
                    entry.status = EntryStatus::Stale;
                    orphaned.push(key.clone());
                }
            }
            self.entries.insert(key, entry);
        }
        orphaned
    }

    /// Mark a view out of date. Returns whether it was cached.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        self.invalidated.insert(key.clone());
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.status = EntryStatus::Stale;
                true
            }
            None => false,
        }
    }

    /// Keys invalidated since the last drain
    pub fn drain_invalidations(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.invalidated.iter().map(|key| key.clone()).collect();
        for key in &keys {
            self.invalidated.remove(key);
        }
        keys.sort();
        keys
    }

    /// Total number of `invalidate` calls over the cache's lifetime
    pub fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Every cached key of one entity kind, sorted
    pub fn keys_of(&self, kind: EntityKind) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| entry.key().kind() == kind)
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn stale_keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| entry.is_stale())
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}
