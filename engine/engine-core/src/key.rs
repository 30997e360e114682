//! Stable identity keys for actions and states.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque 64-bit content hash.
///
/// Two actions with the same key are interchangeable for statistics, and two
/// states with the same key are the same search node. Keys are built with a
/// fixed-key hasher, so the same value always yields the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HashKey(pub u64);

impl HashKey {
    /// Hash any `Hash` value into a key.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Fold another key into this one. Order matters.
    pub fn combine(self, other: HashKey) -> Self {
        Self::of(&(self.0, other.0))
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
