//! Small helpers shared across the crate.

use std::hash::{BuildHasherDefault, Hasher};

/// Fold bytes into a running one-at-a-time hash.
pub fn one_at_a_time_hash(mut hash: u32, key: &[u8]) -> u32 {
  for &byte in key {
    hash = hash.wrapping_add(byte as u32);
    hash = hash.wrapping_add(hash << 10);
    hash ^= hash >> 6;
  }

  hash
}

/// Final avalanche step of the one-at-a-time hash.
pub fn one_at_a_time_mix(mut hash: u32) -> u32 {
  hash = hash.wrapping_add(hash << 3);
  hash ^= hash >> 11;
  hash = hash.wrapping_add(hash << 15);
  hash
}

/// [`Hasher`] folding every written byte with the one-at-a-time function.
///
/// Fields are hashed in the order they are written, so two values whose fields are permuted hash
/// differently.
#[derive(Clone, Copy, Debug, Default)]
pub struct OneAtATimeHasher(u32);

impl Hasher for OneAtATimeHasher {
  fn finish(&self) -> u64 {
    one_at_a_time_mix(self.0) as u64
  }

  fn write(&mut self, bytes: &[u8]) {
    self.0 = one_at_a_time_hash(self.0, bytes);
  }
}

pub type OneAtATimeBuildHasher = BuildHasherDefault<OneAtATimeHasher>;

/// Is `n` a power of two? `0` is not.
pub fn is_pot(n: u32) -> bool {
  n.is_power_of_two()
}
