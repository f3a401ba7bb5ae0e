//! Name interning for descriptors.
//!
//! Type names, method names and field names are interned once per compilation
//! and referred to through `Atom` handles, so descriptor keys hash and compare
//! as plain integers.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned name.
///
/// Atoms are `Copy` and compare in O(1). Use `ShardedInterner::resolve` to get
/// the text back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty name.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names almost every compilation touches.
const COMMON_NAMES: &[&str] = &[
    "java.lang.Object",
    "java.lang.String",
    "java.lang.Comparable",
    "java.lang.Enum",
    "equals",
    "hashCode",
    "toString",
    "compareTo",
    "get",
    "set",
    "$clinit",
    "$init",
    "T",
    "E",
    "K",
    "V",
];

#[derive(Default)]
struct Shard {
    map: FxHashMap<Arc<str>, Atom>,
    names: Vec<Arc<str>>,
}

/// Concurrent name interner.
///
/// Names are spread over fixed shards by hash, so passes running on separate
/// compilation units rarely contend for the same lock. The shard index lives
/// in the low bits of the atom.
pub struct ShardedInterner {
    shards: [RwLock<Shard>; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create an interner with the empty name pre-interned as `Atom::NONE`.
    pub fn new() -> Self {
        let shards: [RwLock<Shard>; SHARD_COUNT] = std::array::from_fn(|_| RwLock::default());
        if let Ok(mut shard) = shards[0].write() {
            let empty: Arc<str> = Arc::from("");
            shard.names.push(empty.clone());
            shard.map.insert(empty, Atom::NONE);
        }
        ShardedInterner { shards }
    }

    /// Intern `name`, returning the existing atom when it was seen before.
    pub fn intern(&self, name: &str) -> Atom {
        if name.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(name);
        if let Ok(shard) = self.shards[shard_idx].read() {
            if let Some(&atom) = shard.map.get(name) {
                return atom;
            }
        }

        let Ok(mut shard) = self.shards[shard_idx].write() else {
            return Atom::NONE;
        };
        // Another thread may have won the race between the two locks.
        if let Some(&atom) = shard.map.get(name) {
            return atom;
        }

        let local_index = shard.names.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Atom((local_index << SHARD_BITS) | (shard_idx as u32 & SHARD_MASK));
        let owned: Arc<str> = Arc::from(name);
        shard.names.push(owned.clone());
        shard.map.insert(owned, atom);
        atom
    }

    /// Resolve an atom, returning the empty string for unknown atoms.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Resolve an atom, returning `None` for atoms this interner never produced.
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let (shard_idx, local_index) = if atom.is_none() {
            (0, 0)
        } else {
            ((atom.0 & SHARD_MASK) as usize, (atom.0 >> SHARD_BITS) as usize)
        };
        let shard = self.shards.get(shard_idx)?.read().ok()?;
        shard.names.get(local_index).cloned()
    }

    /// Number of interned names, including the empty name.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().map(|s| s.names.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern names used by nearly every compilation.
    pub fn intern_common(&self) {
        for name in COMMON_NAMES {
            self.intern(name);
        }
    }

    #[inline]
    fn shard_for(name: &str) -> usize {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}
