//! In-memory store for tests and local runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Entries = HashMap<(String, String), Vec<u8>>;

/// In-memory key/value store scoped to one namespace.
///
/// Clones share the same entries. [`MemStore::with_prefix`] gives a view of
/// the same entries under another namespace.
#[derive(Debug, Clone)]
pub struct MemStore {
    name: String,
    prefix: String,
    entries: Arc<RwLock<Entries>>,
}

impl MemStore {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            entries: Arc::default(),
        }
    }

    /// Same backing entries, different namespace.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            prefix: prefix.into(),
            entries: Arc::clone(&self.entries),
        }
    }

    /// The address this store was opened with (`test` for `mem://test`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn put(&self, key: &str, value: &[u8]) {
        self.write()
            .insert((self.prefix.clone(), key.to_string()), value.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.read()
            .get(&(self.prefix.clone(), key.to_string()))
            .cloned()
    }

    pub fn delete(&self, key: &str) -> bool {
        self.write()
            .remove(&(self.prefix.clone(), key.to_string()))
            .is_some()
    }

    /// Number of entries in this namespace.
    pub fn len(&self) -> usize {
        self.read().keys().filter(|(ns, _)| *ns == self.prefix).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a HashMap half-updated,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemStore::new("test", "prefix");
        assert!(store.is_empty());

        store.put("k", b"v");
        assert_eq!(store.get("k").as_deref(), Some(&b"v"[..]));
        assert_eq!(store.len(), 1);

        assert!(store.delete("k"));
        assert!(!store.delete("k"));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn namespaces_do_not_overlap() {
        let a = MemStore::new("test", "a");
        let b = a.with_prefix("b");

        a.put("k", b"from-a");
        b.put("k", b"from-b");

        assert_eq!(a.get("k").as_deref(), Some(&b"from-a"[..]));
        assert_eq!(b.get("k").as_deref(), Some(&b"from-b"[..]));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let store = MemStore::new("test", "p");
        let clone = store.clone();
        clone.put("k", b"v");
        assert_eq!(store.get("k").as_deref(), Some(&b"v"[..]));
    }
}
