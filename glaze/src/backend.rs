//! Backend interfacing.
//!
//! A backend is a type implementing every capability trait of this module. The rest of the crate
//! only ever reaches native code through these traits:
//!
//! - [`features::Features`](self::features::Features) detects what the backend can do.
//! - [`pixel::Pixel`](self::pixel::Pixel) translates pixel formats.
//! - [`sampler::Sampler`](self::sampler::Sampler) creates, destroys and binds sampler objects.
//! - [`texture::Texture`](self::texture::Texture) allocates, uploads, configures and frees textures.
//! - [`clip::Clip`](self::clip::Clip) drives the scissor and the auxiliary mask plane.
//!
//! Slots with a default implementation are optional; the default is a no-op success. The traits
//! are `unsafe` to implement because the core trusts the handles they hand back.

pub mod clip;
pub mod features;
pub mod pixel;
pub mod sampler;
pub mod texture;

/// A complete backend.
///
/// This trait is implemented automatically for every type implementing all the capability traits.
pub trait Backend:
  features::Features + pixel::Pixel + sampler::Sampler + texture::Texture + clip::Clip
{
}

impl<B> Backend for B where
  B: ?Sized + features::Features + pixel::Pixel + sampler::Sampler + texture::Texture + clip::Clip
{
}
