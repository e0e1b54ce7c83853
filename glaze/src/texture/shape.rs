//! Texture shapes.
//!
//! A shape fixes the native target of a texture, how its size is expressed and which sampling
//! rules apply to it.

use std::fmt::Debug;

use crate::features::{Features, Limits};
use crate::texture::TextureTarget;

/// Reify a texture shape.
pub trait TextureShape {
  /// Size of a texture of this shape.
  type Size: Copy + Debug + Eq;

  /// Native target.
  const TARGET: TextureTarget;

  /// Feature the backend must expose for this shape to be usable at all.
  const REQUIRED_FEATURE: Features;

  /// Whether non-power-of-two sizes need [`Features::TEXTURE_NPOT`].
  const NPOT_RESTRICTED: bool;

  /// Whether foreign handles can be adopted with this shape.
  const FOREIGN: bool;

  /// Whether textures of this shape can have mipmaps.
  const MIPMAPS: bool;

  /// Whether the third wrap mode applies.
  const WRAP_R: bool;

  /// Whether sampling is restricted to non-mipmap filters and the clamp wrap modes.
  const CLAMP_ONLY: bool;

  /// Width, height and depth of a size; missing axes are `1`.
  fn extent(size: Self::Size) -> [u32; 3];

  /// Largest extent allowed on any axis.
  fn max_extent(limits: &Limits) -> u32;
}

/// 2D textures.
#[derive(Clone, Copy, Debug)]
pub struct Dim2;

impl TextureShape for Dim2 {
  type Size = [u32; 2];

  const TARGET: TextureTarget = TextureTarget::Texture2D;
  const REQUIRED_FEATURE: Features = Features::empty();
  const NPOT_RESTRICTED: bool = true;
  const FOREIGN: bool = true;
  const MIPMAPS: bool = true;
  const WRAP_R: bool = false;
  const CLAMP_ONLY: bool = false;

  fn extent([w, h]: Self::Size) -> [u32; 3] {
    [w, h, 1]
  }

  fn max_extent(limits: &Limits) -> u32 {
    limits.max_texture_size
  }
}

/// 3D textures.
#[derive(Clone, Copy, Debug)]
pub struct Dim3;

impl TextureShape for Dim3 {
  type Size = [u32; 3];

  const TARGET: TextureTarget = TextureTarget::Texture3D;
  const REQUIRED_FEATURE: Features = Features::TEXTURE_3D;
  const NPOT_RESTRICTED: bool = true;
  const FOREIGN: bool = false;
  const MIPMAPS: bool = true;
  const WRAP_R: bool = true;
  const CLAMP_ONLY: bool = false;

  fn extent(size: Self::Size) -> [u32; 3] {
    size
  }

  fn max_extent(limits: &Limits) -> u32 {
    limits.max_3d_texture_size
  }
}

/// Rectangle textures, sampled with non-normalized coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Rectangle;

impl TextureShape for Rectangle {
  type Size = [u32; 2];

  const TARGET: TextureTarget = TextureTarget::Rectangle;
  const REQUIRED_FEATURE: Features = Features::TEXTURE_RECTANGLE;
  const NPOT_RESTRICTED: bool = false;
  const FOREIGN: bool = true;
  const MIPMAPS: bool = false;
  const WRAP_R: bool = false;
  const CLAMP_ONLY: bool = true;

  fn extent([w, h]: Self::Size) -> [u32; 3] {
    [w, h, 1]
  }

  fn max_extent(limits: &Limits) -> u32 {
    limits.max_rectangle_texture_size
  }
}
