//! Stable element identifiers.
//!
//! An `ElementId` is the only identity a node keeps across frames. It keys
//! the hit-test snapshot and the scroll memory; it is never an ownership key.

use serde::{Deserialize, Serialize};

/// FNV-1a offset basis.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime.
const FNV_PRIME: u64 = 0x100000001b3;

/// Identifier for a layout element, derived deterministically from a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Id of the implicit parent of the root element.
    pub const ROOT_PARENT: Self = Self(FNV_OFFSET);

    /// Create a stable id from a name. Same name, same id, every frame.
    pub fn named(name: &str) -> Self {
        Self(hash_str(name))
    }

    /// Create an id for the `index`-th instance of a repeated name,
    /// e.g. list rows declared in a loop.
    pub fn indexed(name: &str, index: u32) -> Self {
        Self(mix(hash_str(name), index as u64))
    }

    /// Derive the id of an anonymous child from its parent and position.
    #[inline]
    pub fn child(self, index: u32) -> Self {
        Self(mix(self.0.rotate_left(5) ^ 0x9e3779b97f4a7c15, index as u64 + 1))
    }

    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl From<&str> for ElementId {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// FNV-1a over the bytes of `s`.
#[inline]
pub(crate) fn hash_str(s: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn mix(hash: u64, value: u64) -> u64 {
    hash.wrapping_mul(FNV_PRIME).wrapping_add(value)
}
