//! Ordered keyed container backing every collection.
//!
//! # Responsibility
//! - Map keys to members, ordered solely by the configured comparer.
//! - Offer key-based, positional and ordered traversal access.
//!
//! # Invariants
//! - `entries` is sorted by `comparer` and holds no two equal keys.
//! - Null keys are never stored.
//! - `version` changes on every structural mutation; detached cursors use it
//!   to detect concurrent modification.
//! - Every storage carries a process-unique `id`; a cursor only advances on
//!   the storage that issued it.

use crate::error::{CollectionError, CollectionResult};
use crate::key::{KeyComparer, ObjectComparer, ObjectKey};
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_STORAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_storage_id() -> u64 {
    NEXT_STORAGE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Sorted-array keyed storage with binary-search lookup.
pub struct KeyedStorage<K, T, C = KeyComparer> {
    entries: Vec<(K, T)>,
    comparer: C,
    id: u64,
    version: u64,
}

/// Detached traversal position validated against the issuing storage and
/// its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    storage_id: u64,
    position: usize,
    version: u64,
}

impl Cursor {
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<K, T, C> KeyedStorage<K, T, C>
where
    K: ObjectKey,
    C: ObjectComparer<K>,
{
    pub fn new(comparer: C) -> Self {
        Self {
            entries: Vec::new(),
            comparer,
            id: next_storage_id(),
            version: 0,
        }
    }

    /// Builds storage from entries already sorted by `comparer` with no
    /// equal or null keys.
    pub(crate) fn from_sorted_entries(comparer: C, entries: Vec<(K, T)>) -> Self {
        debug_assert!(entries
            .windows(2)
            .all(|pair| comparer.compare(&pair[0].0, &pair[1].0) == std::cmp::Ordering::Less));
        Self {
            entries,
            comparer,
            id: next_storage_id(),
            version: 0,
        }
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Inserts one member at its ordered position.
    ///
    /// # Errors
    /// - `InvalidKey` when `key` is null.
    /// - `DuplicateKey` when an equal key is already stored; storage is
    ///   left unchanged.
    pub fn insert(&mut self, key: K, member: T) -> CollectionResult<()> {
        if key.is_null() {
            return Err(CollectionError::InvalidKey(key.to_string()));
        }

        match self.search(&key) {
            Ok(_) => Err(CollectionError::DuplicateKey(key.to_string())),
            Err(position) => {
                self.entries.insert(position, (key, member));
                self.bump_version();
                Ok(())
            }
        }
    }

    /// Removes and returns the member stored under `key`.
    pub fn remove(&mut self, key: &K) -> CollectionResult<T> {
        let position = self
            .search(key)
            .map_err(|_| CollectionError::NotFound(key.to_string()))?;
        let (_, member) = self.entries.remove(position);
        self.bump_version();
        Ok(member)
    }

    pub fn lookup(&self, key: &K) -> CollectionResult<&T> {
        self.try_lookup(key)
            .ok_or_else(|| CollectionError::NotFound(key.to_string()))
    }

    pub fn lookup_mut(&mut self, key: &K) -> CollectionResult<&mut T> {
        match self.search(key) {
            Ok(position) => Ok(&mut self.entries[position].1),
            Err(_) => Err(CollectionError::NotFound(key.to_string())),
        }
    }

    /// No-fault lookup: absence is an ordinary outcome.
    pub fn try_lookup(&self, key: &K) -> Option<&T> {
        self.search(key)
            .ok()
            .map(|position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    /// Returns the member at `index` in comparer order.
    pub fn by_position(&self, index: usize) -> CollectionResult<&T> {
        self.entries
            .get(index)
            .map(|(_, member)| member)
            .ok_or(CollectionError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.entries.get(index).map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Process-unique identity stamped on every cursor this storage issues.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Members in key order. Restartable: each call starts from the front.
    pub fn iter(&self) -> Members<'_, K, T> {
        Members {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&K, &T)> + '_ {
        self.entries.iter().map(|(key, member)| (key, member))
    }

    /// Starts a detached traversal that does not hold a borrow.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            storage_id: self.id,
            position: 0,
            version: self.version,
        }
    }

    /// Yields the next member for `cursor`.
    ///
    /// # Errors
    /// - `ForeignCursor` when another storage issued `cursor`.
    /// - `ConcurrentModification` when the storage changed since the cursor
    ///   was taken.
    pub fn advance(&self, cursor: &mut Cursor) -> CollectionResult<Option<&T>> {
        if cursor.storage_id != self.id {
            return Err(CollectionError::ForeignCursor {
                cursor_storage: cursor.storage_id,
                storage: self.id,
            });
        }
        if cursor.version != self.version {
            return Err(CollectionError::ConcurrentModification {
                expected_version: cursor.version,
                actual_version: self.version,
            });
        }

        let member = self.entries.get(cursor.position).map(|(_, member)| member);
        if member.is_some() {
            cursor.position += 1;
        }
        Ok(member)
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.bump_version();
        }
    }

    /// Consumes the storage, yielding entries in key order.
    pub fn into_entries(self) -> Vec<(K, T)> {
        self.entries
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(stored, _)| self.comparer.compare(stored, key))
    }

    /// Takes over the identity of the storage this one replaces and moves
    /// past its version, so cursors taken on it are reported as stale.
    pub(crate) fn continue_from(&mut self, replaced_id: u64, replaced_version: u64) {
        self.id = replaced_id;
        self.version = replaced_version.max(self.version).wrapping_add(1);
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl<K, T, C> Debug for KeyedStorage<K, T, C>
where
    K: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStorage")
            .field("keys", &self.entries.iter().map(|(key, _)| key).collect::<Vec<_>>())
            .field("id", &self.id)
            .field("version", &self.version)
            .finish()
    }
}

impl<'a, K, T, C> IntoIterator for &'a KeyedStorage<K, T, C>
where
    K: ObjectKey,
    C: ObjectComparer<K>,
{
    type Item = &'a T;
    type IntoIter = Members<'a, K, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing traversal over members in key order.
///
/// The shared borrow statically rules out mutation mid-traversal.
pub struct Members<'a, K, T> {
    inner: slice::Iter<'a, (K, T)>,
}

impl<'a, K, T> Iterator for Members<'a, K, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, member)| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, T> DoubleEndedIterator for Members<'_, K, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, member)| member)
    }
}

impl<K, T> ExactSizeIterator for Members<'_, K, T> {}

impl<K, T> FusedIterator for Members<'_, K, T> {}

#[cfg(test)]
mod tests {
    use super::KeyedStorage;
    use crate::config::StringComparer;
    use crate::error::CollectionError;
    use crate::key::{IdObjectKey, KeyComparer, SimpleObjectKey};

    fn names() -> KeyedStorage<SimpleObjectKey, &'static str> {
        KeyedStorage::new(KeyComparer::new(StringComparer::case_sensitive()))
    }

    #[test]
    fn traversal_follows_key_order_not_insertion_order() {
        let mut storage = KeyedStorage::new(KeyComparer::default());
        for id in [30, 10, 20] {
            storage.insert(IdObjectKey::new(id), id).expect("insert");
        }
        assert_eq!(storage.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(storage.iter().rev().copied().collect::<Vec<_>>(), vec![30, 20, 10]);
        assert_eq!(storage.len(), 3);
    }

    #[test]
    fn duplicate_insert_leaves_storage_unchanged() {
        let mut storage = names();
        storage.insert(SimpleObjectKey::new("a"), "first").expect("insert");
        let version = storage.version();

        let err = storage
            .insert(SimpleObjectKey::new("a"), "second")
            .expect_err("duplicate must fail");
        assert!(matches!(err, CollectionError::DuplicateKey(_)));
        assert_eq!(storage.version(), version);
        assert_eq!(storage.lookup(&SimpleObjectKey::new("a")).ok(), Some(&"first"));
    }

    #[test]
    fn null_key_is_rejected() {
        let mut storage = names();
        let err = storage
            .insert(SimpleObjectKey::new(""), "ghost")
            .expect_err("null key must fail");
        assert!(matches!(err, CollectionError::InvalidKey(_)));
        assert!(storage.is_empty());
    }

    #[test]
    fn by_position_reports_range() {
        let mut storage = names();
        storage.insert(SimpleObjectKey::new("b"), "b").expect("insert");
        storage.insert(SimpleObjectKey::new("a"), "a").expect("insert");
        assert_eq!(storage.by_position(0).ok(), Some(&"a"));
        assert_eq!(storage.key_at(1), Some(&SimpleObjectKey::new("b")));
        assert!(matches!(
            storage.by_position(2),
            Err(CollectionError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn cursor_detects_mutation() {
        let mut storage = names();
        storage.insert(SimpleObjectKey::new("a"), "a").expect("insert");
        storage.insert(SimpleObjectKey::new("b"), "b").expect("insert");

        let mut cursor = storage.cursor();
        assert_eq!(storage.advance(&mut cursor).expect("advance"), Some(&"a"));

        storage.remove(&SimpleObjectKey::new("b")).expect("remove");
        let err = storage
            .advance(&mut cursor)
            .expect_err("mutation must be detected");
        assert!(matches!(err, CollectionError::ConcurrentModification { .. }));
    }

    #[test]
    fn cursor_runs_to_exhaustion() {
        let mut storage = names();
        storage.insert(SimpleObjectKey::new("only"), "only").expect("insert");
        let mut cursor = storage.cursor();
        assert!(storage.advance(&mut cursor).expect("first").is_some());
        assert!(storage.advance(&mut cursor).expect("end").is_none());
        assert!(storage.advance(&mut cursor).expect("still end").is_none());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn cursor_is_bound_to_its_issuing_storage() {
        let mut left = names();
        let mut right = names();
        left.insert(SimpleObjectKey::new("a"), "left").expect("insert");
        right.insert(SimpleObjectKey::new("a"), "right").expect("insert");
        assert_eq!(left.version(), right.version());
        assert_ne!(left.id(), right.id());

        let mut cursor = left.cursor();
        let err = right
            .advance(&mut cursor)
            .expect_err("cursor from another storage must fail");
        assert!(matches!(err, CollectionError::ForeignCursor { .. }));
        assert_eq!(cursor.position(), 0);
        assert_eq!(left.advance(&mut cursor).expect("own storage"), Some(&"left"));
    }

    #[test]
    fn replacement_storage_keeps_identity_and_invalidates_cursors() {
        let mut old = names();
        old.insert(SimpleObjectKey::new("a"), "a").expect("insert");
        let mut cursor = old.cursor();

        let mut replacement = names();
        replacement.insert(SimpleObjectKey::new("a"), "a").expect("insert");
        replacement.continue_from(old.id(), old.version());

        assert_eq!(replacement.id(), old.id());
        assert!(replacement.version() > old.version());
        let err = replacement
            .advance(&mut cursor)
            .expect_err("stale cursor must fail");
        assert!(matches!(err, CollectionError::ConcurrentModification { .. }));
    }
}
