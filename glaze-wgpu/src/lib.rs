//! [wgpu](https://crates.io/crates/wgpu) backend for [glaze](https://crates.io/crates/glaze).
//!
//! [`Wgpu`] wraps a device and its queue. Textures and sampler objects are created on the device
//! and handed back to glaze as slot keys; the draw layer resolves them with [`Wgpu::texture`] and
//! [`Wgpu::sampler`] when it builds its bind groups.
//!
//! Clipping is scissor-only: the backend has no mask plane, and the scissor rectangle realized by
//! the last flush is exposed with [`Wgpu::scissor`] for the draw layer to apply to its render
//! passes.

mod device;
mod pixel;
mod sampler;
mod texture;

pub use device::{SamplerKey, TextureKey, Wgpu};
