//! Deterministic hash-based symbol identity.
//!
//! [`SymbolHash`] is a 64-bit hash identifying a type or a member. Hashes are
//! computed from qualified names, so the front end and the metadata store
//! agree on identities without sharing a registration order.
//!
//! # Examples
//!
//! ```
//! use sablejs_core::SymbolHash;
//!
//! let point = SymbolHash::from_name("Geometry.Point");
//! assert_eq!(point, SymbolHash::from_name("Geometry.Point"));
//!
//! let x = SymbolHash::from_member(point, "X");
//! assert_ne!(x, SymbolHash::from_name("X"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for chaining path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for member (field, property, indexer, method) hashes.
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Per-position markers so parameter order changes the hash.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolHash(pub u64);

impl SymbolHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: SymbolHash = SymbolHash(0);

    /// Create a hash from a qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        SymbolHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a member hash from its declaring type and member name.
    #[inline]
    pub fn from_member(owner: SymbolHash, name: &str) -> Self {
        SymbolHash(hash_constants::MEMBER ^ owner.0.wrapping_mul(hash_constants::SEP) ^ xxh64(name.as_bytes(), 0))
    }

    /// Create an indexer hash from the declaring type and the parameter types.
    ///
    /// Indexers share the member name `Item`, so overloads are told apart by
    /// their parameter list. Parameter order matters.
    pub fn from_indexer(owner: SymbolHash, param_types: &[SymbolHash]) -> Self {
        let mut hash = Self::from_member(owner, "Item").0;
        for (i, param) in param_types.iter().enumerate() {
            let marker = hash_constants::PARAM_MARKERS
                .get(i)
                .copied()
                .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
            hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ param.0);
        }
        SymbolHash(hash)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolHash({:#018x})", self.0)
    }
}

impl fmt::Display for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
