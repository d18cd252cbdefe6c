//! Seed-free deterministic hashing.
//!
//! Source sampling and tile variation must come out identical on every
//! platform and every run, so they use a fixed integer mixer instead of a
//! PRNG.

/// Multiplier applied to an id before mixing when building a sample key.
pub const SAMPLE_MULTIPLIER: u64 = 0xD1B5_4A32_D192_ED03;

/// The splitmix64 finalizer.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Sort key for deterministic sampling of item `id`.
#[inline]
pub fn sample_key(id: usize) -> u64 {
    splitmix64((id as u64).wrapping_mul(SAMPLE_MULTIPLIER))
}
