//! Ordering strategies over keys of one concrete kind.

use crate::config::StringComparer;
use crate::key::ObjectKey;
use std::cmp::Ordering;

/// Strategy that orders two keys of the same kind.
pub trait ObjectComparer<K> {
    fn compare(&self, left: &K, right: &K) -> Ordering;

    fn equals(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}

/// Default comparer: delegates to the key, supplying the collection's
/// string policy for name-bearing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyComparer {
    strings: StringComparer,
}

impl KeyComparer {
    pub const fn new(strings: StringComparer) -> Self {
        Self { strings }
    }

    pub fn strings(&self) -> &StringComparer {
        &self.strings
    }
}

impl From<StringComparer> for KeyComparer {
    fn from(strings: StringComparer) -> Self {
        Self::new(strings)
    }
}

impl<K: ObjectKey> ObjectComparer<K> for KeyComparer {
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.compare(right, &self.strings)
    }
}
