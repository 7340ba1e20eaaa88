//! Deterministic hashing used to derive per-stream RNG seeds. The standard library hasher is
//! randomly seeded per process, so it cannot be used where runs must be reproducible from a
//! base seed.

use xxhash_rust::xxh3::xxh3_64;

/// A convenience method to compute the hash of a `&str`.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
