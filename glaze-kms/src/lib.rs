//! Kernel mode-setting backend for [glaze](https://crates.io/crates/glaze).
//!
//! [`Kms`] manages host-mapped dumb buffers, the linear scanout memory every DRM driver exposes.
//! Buffers are allocated out of a fixed memory budget ([`KmsConfig::memory_budget`]); running
//! past it fails allocation with
//! [`ResourceExhausted`](glaze::ErrorKind::ResourceExhausted) and leaves nothing behind.
//!
//! There are no sampler objects, 3D nor rectangle textures. Clipping is scissor-only and the
//! realized scissor is exposed as the plane crop rectangle with [`Kms::crop`].

mod buffer;
mod device;
mod format;

pub use device::{
  aligned_pitch, BufferKey, DumbBuffer, Kms, KmsConfig, ScalingFilter, PITCH_ALIGNMENT,
};
pub use format::Fourcc;
