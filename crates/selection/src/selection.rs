//! A single namespace's set of selected keys.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Internally synchronized, unordered key set.
///
/// Hollow (empty) keys never survive a mutation: they are skipped on insert
/// and purged before the write guard is released.
#[derive(Debug, Default)]
pub struct Selection {
    keys: RwLock<HashSet<String>>,
}

fn is_hollow(key: &str) -> bool {
    key.is_empty()
}

fn purge_hollow(keys: &mut HashSet<String>) {
    keys.retain(|key| !is_hollow(key));
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every key; returns whether the set changed.
    pub fn insert_all<I, S>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.keys.write();
        let before = guard.len();
        guard.extend(
            keys.into_iter()
                .map(Into::into)
                .filter(|key: &String| !is_hollow(key)),
        );
        purge_hollow(&mut guard);
        guard.len() != before
    }

    /// Removes every key; absent keys are ignored.
    pub fn remove_all<I, S>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.keys.write();
        let before = guard.len();
        for key in keys {
            guard.remove(key.as_ref());
        }
        purge_hollow(&mut guard);
        guard.len() != before
    }

    pub fn clear(&self) {
        self.keys.write().clear();
    }

    /// Clears and refills under one write guard, so readers see either the
    /// old contents or the new ones.
    pub fn replace<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.keys.write();
        guard.clear();
        guard.extend(
            keys.into_iter()
                .map(Into::into)
                .filter(|key: &String| !is_hollow(key)),
        );
        guard.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Copy of the current keys; later mutations are not reflected.
    pub fn snapshot(&self) -> HashSet<String> {
        self.keys.read().clone()
    }

    /// Runs `f` against the live set while holding the read guard.
    pub fn with_keys<R>(&self, f: impl FnOnce(&HashSet<String>) -> R) -> R {
        f(&self.keys.read())
    }
}
