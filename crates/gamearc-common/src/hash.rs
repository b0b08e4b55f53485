//! Path hashing for descriptor tables.
//!
//! FSG-FILE-SYSTEM images index their files by a 32-bit hash of the
//! canonical path. The accumulator looks like FNV-1 but multiplies by
//! `1677619` instead of the FNV prime `16777619`. Stored hashes in shipped
//! images were produced with this constant, so it must not be corrected.

use std::borrow::Cow;
use std::fmt;

/// Initial accumulator value (the FNV-1 32-bit offset basis).
pub const HASH_SEED: u32 = 2_166_136_261;

/// Per-byte multiplier.
pub const HASH_MULTIPLIER: u32 = 1_677_619;

/// A 32-bit path hash as stored in descriptor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathHash(pub u32);

impl PathHash {
    /// The raw hash value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for PathHash {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PathHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Canonicalize a path for hashing.
///
/// Strips one leading `/` and uppercases ASCII letters. Other bytes,
/// including non-ASCII UTF-8 sequences, are left unchanged.
pub fn canonicalize(path: &str) -> Cow<'_, str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.bytes().any(|b| b.is_ascii_lowercase()) {
        Cow::Owned(path.to_ascii_uppercase())
    } else {
        Cow::Borrowed(path)
    }
}

/// Hash a path the way descriptor tables expect.
///
/// Equivalent to hashing the bytes of [`canonicalize`]`(path)`, without
/// allocating.
pub fn path_hash(path: &str) -> PathHash {
    path_hash_bytes(path.as_bytes())
}

/// Hash a path given as stored bytes.
///
/// Archive names need not be UTF-8; bytes outside ASCII enter the hash
/// unchanged.
pub fn path_hash_bytes(path: &[u8]) -> PathHash {
    let path = path.strip_prefix(b"/").unwrap_or(path);
    PathHash(hash_bytes(path.iter().map(u8::to_ascii_uppercase)))
}

/// Run the accumulator over an already canonical byte sequence.
#[inline]
pub fn hash_bytes<I: IntoIterator<Item = u8>>(bytes: I) -> u32 {
    bytes.into_iter().fold(HASH_SEED, |hash, b| {
        hash.wrapping_mul(HASH_MULTIPLIER) ^ u32::from(b)
    })
}
