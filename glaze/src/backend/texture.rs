//! Texture backend interface.
//!
//! Creating a texture is split into generating a handle ([`Texture::gen_texture`]) and giving it
//! storage ([`Texture::texture_storage`] or [`Texture::texture_upload`]), so that the core can
//! delete the handle again when storage allocation fails.

use std::fmt::Debug;

use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::pixel::NativeFormat;
use crate::sampler::{MagFilter, MinFilter, WrapMode};
use crate::texture::{FirstPixel, TextureTarget};

/// What can be learnt about a foreign texture.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ForeignInfo {
  /// The texture storage is compressed.
  pub compressed: bool,
  /// Native internal format, if it could be queried.
  pub internal_format: Option<u32>,
}

/// Texture interface.
pub unsafe trait Texture {
  /// Backend representation of a texture.
  type TextureRepr: Copy + Debug + Eq;

  /// Generate a new texture handle without storage.
  ///
  /// Filters of the new texture must be initialized to linear / linear.
  unsafe fn gen_texture(&mut self, target: TextureTarget) -> Self::TextureRepr;

  /// Delete a texture handle.
  unsafe fn delete_texture(&mut self, target: TextureTarget, texture: Self::TextureRepr);

  /// Check whether a texture of the given size and format can be created.
  unsafe fn size_supported(
    &mut self,
    target: TextureTarget,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> bool;

  /// Allocate uninitialized storage.
  ///
  /// Must fail with [`ResourceExhausted`](crate::error::ErrorKind::ResourceExhausted) if the
  /// backend runs out of memory.
  unsafe fn texture_storage(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error>;

  /// Allocate storage and fill it with the content of a bitmap.
  ///
  /// `format` is the storage format, `upload_format` the format of the bitmap's texels. For 3D
  /// textures, the bitmap holds `size[2]` images of `size[1]` rows.
  unsafe fn texture_upload(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    upload_format: &NativeFormat,
    bitmap: &Bitmap,
    size: [u32; 3],
  ) -> Result<(), Error>;

  /// Bind a foreign texture, checking that the handle is usable with the target.
  unsafe fn bind_foreign(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> Result<(), Error>;

  /// Query the parameters of a (bound) foreign texture.
  ///
  /// Only called when the backend reports
  /// [`QUERY_TEXTURE_PARAMETERS`](crate::features::Features::QUERY_TEXTURE_PARAMETERS).
  unsafe fn query_texture_parameters(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> ForeignInfo {
    let _ = (target, texture);
    ForeignInfo::default()
  }

  /// Set the filters of a texture.
  unsafe fn set_texture_filters(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  );

  /// Set the wrap modes of a texture; `wrap_r` is only given for 3D textures.
  ///
  /// Wrap modes are already resolved; [`WrapMode::Automatic`] never reaches the backend.
  unsafe fn set_texture_wrap_modes(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    wrap_r: Option<WrapMode>,
  );

  /// Generate the mipmap chain natively.
  ///
  /// Only called when the backend reports [`OFFSCREEN`](crate::features::Features::OFFSCREEN).
  unsafe fn generate_mipmap(&mut self, target: TextureTarget, texture: Self::TextureRepr) {
    let _ = (target, texture);
  }

  /// Regenerate the mipmap chain by rewriting the first pixel with automatic mipmap generation
  /// switched on.
  ///
  /// Only called when the backend reports
  /// [`LEGACY_AUTO_MIPMAP`](crate::features::Features::LEGACY_AUTO_MIPMAP) but not
  /// [`OFFSCREEN`](crate::features::Features::OFFSCREEN).
  unsafe fn legacy_generate_mipmap(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    first_pixel: &FirstPixel,
  ) {
    let _ = (target, texture, first_pixel);
  }

  /// Bind a texture to a texture unit for sampling.
  unsafe fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Self::TextureRepr);
}
