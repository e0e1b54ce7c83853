//! Sampler object backend interface.

use std::fmt::Debug;

use crate::sampler::SamplerState;

/// Sampler objects.
///
/// Only used when the backend reports
/// [`SAMPLER_OBJECTS`](crate::features::Features::SAMPLER_OBJECTS).
pub unsafe trait Sampler {
  /// Backend representation of a sampler object.
  type SamplerRepr: Copy + Debug + Eq;

  /// Create a native sampler object for a state whose wrap modes are already resolved.
  unsafe fn create_sampler(&mut self, state: &SamplerState) -> Self::SamplerRepr;

  /// Destroy a native sampler object.
  unsafe fn destroy_sampler(&mut self, sampler: Self::SamplerRepr);

  /// Bind a sampler object to a texture unit.
  unsafe fn bind_sampler(&mut self, unit: u32, sampler: Self::SamplerRepr);
}
