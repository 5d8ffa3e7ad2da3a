// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A keyed store of live resource entries for one handle class.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Maps raw handle values to shared entries.
///
/// Values come from a per-table counter that starts at 1 and only grows, so a
/// handle is never reissued while the table lives. Lookups clone the entry's
/// `Arc`, which keeps a resolved object alive even if its handle is destroyed
/// while the caller still uses it.
#[derive(Debug)]
pub(crate) struct HandleTable<T> {
    entries: RwLock<HashMap<u64, Arc<T>>>,
    next: AtomicU64,
}

impl<T> HandleTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
        }
    }

    /// Stores an entry under a fresh handle value and returns that value.
    pub(crate) fn insert(&self, entry: T) -> u64 {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(raw, Arc::new(entry));
        raw
    }

    pub(crate) fn get(&self, raw: u64) -> Option<Arc<T>> {
        if raw == 0 {
            return None;
        }
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&raw)
            .cloned()
    }

    pub(crate) fn contains(&self, raw: u64) -> bool {
        raw != 0
            && self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&raw)
    }

    pub(crate) fn remove(&self, raw: u64) -> Option<Arc<T>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&raw)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Removes every entry and returns how many there were.
    pub(crate) fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let count = entries.len();
        entries.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_start_at_one_and_increase() {
        let table = HandleTable::new();
        assert_eq!(table.insert("a"), 1);
        assert_eq!(table.insert("b"), 2);
        table.remove(2);
        assert_eq!(table.insert("c"), 3);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_null_never_resolves() {
        let table = HandleTable::new();
        table.insert(7u32);
        assert!(table.get(0).is_none());
        assert!(!table.contains(0));
        assert_eq!(table.get(1).as_deref(), Some(&7));
    }

    #[test]
    fn test_removed_entry_stays_alive_for_holders() {
        let table = HandleTable::new();
        let raw = table.insert(String::from("buffer"));
        let held = table.get(raw);
        assert!(table.remove(raw).is_some());
        assert!(table.remove(raw).is_none());
        assert_eq!(held.as_deref().map(String::as_str), Some("buffer"));
    }

    #[test]
    fn test_clear_reports_count() {
        let table = HandleTable::new();
        table.insert(1u8);
        table.insert(2u8);
        assert_eq!(table.clear(), 2);
        assert_eq!(table.len(), 0);
    }
}
