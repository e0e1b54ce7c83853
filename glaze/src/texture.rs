//! Texture resources.
//!
//! A [`Texture`] owns (or, for foreign textures, merely wraps) a native texture handle. It is
//! created from exactly one [`TextureLoader`] and allocated lazily: nothing reaches the backend
//! before [`Texture::allocate`] is called.
//!
//! On backends without sampler objects, filters and wrap modes are texture state. The texture
//! remembers what it last set so that flushing the same state twice doesn't issue any native call.

mod shape;

pub use self::shape::{Dim2, Dim3, Rectangle, TextureShape};

use log::warn;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::backend::Backend;
use crate::bitmap::Bitmap;
use crate::error::{Error, ErrorDomain};
use crate::features::{Capabilities, Features};
use crate::pixel::{determine_internal_format, NativeFormat, PixelFormat};
use crate::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use crate::util::is_pot;

/// Native texture target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureTarget {
  Texture2D,
  Texture3D,
  Rectangle,
}

impl fmt::Display for TextureTarget {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TextureTarget::Texture2D => f.write_str("2D texture"),
      TextureTarget::Texture3D => f.write_str("3D texture"),
      TextureTarget::Rectangle => f.write_str("rectangle texture"),
    }
  }
}

/// Where the content of a texture comes from.
#[derive(Debug)]
pub enum TextureLoader<S, T>
where
  S: TextureShape,
{
  /// Uninitialized storage of the given size.
  Sized(S::Size),

  /// Decoded pixels. For 3D textures, the bitmap stacks the depth images vertically.
  Bitmap { bitmap: Bitmap, size: S::Size },

  /// A native handle created outside of the library, in the given format.
  Foreign {
    handle: T,
    size: S::Size,
    format: PixelFormat,
  },
}

impl<S, T> TextureLoader<S, T>
where
  S: TextureShape,
{
  fn size(&self) -> S::Size {
    match *self {
      TextureLoader::Sized(size)
      | TextureLoader::Bitmap { size, .. }
      | TextureLoader::Foreign { size, .. } => size,
    }
  }

  fn kind(&self) -> LoaderKind {
    match self {
      TextureLoader::Sized(_) => LoaderKind::Sized,
      TextureLoader::Bitmap { .. } => LoaderKind::Bitmap,
      TextureLoader::Foreign { .. } => LoaderKind::Foreign,
    }
  }
}

/// Tag of a [`TextureLoader`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoaderKind {
  Sized,
  Bitmap,
  Foreign,
}

/// Copy of the first pixel of a texture, used to regenerate mipmaps on backends where rewriting
/// texels is the only way to trigger mipmap generation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FirstPixel {
  /// Native format of the pixel.
  pub format: NativeFormat,
  data: [u8; 4],
  len: usize,
}

impl FirstPixel {
  fn new(format: NativeFormat, bytes: &[u8]) -> Option<Self> {
    if bytes.len() > 4 {
      return None;
    }

    let mut data = [0; 4];
    data[..bytes.len()].copy_from_slice(bytes);

    Some(FirstPixel {
      format,
      data,
      len: bytes.len(),
    })
  }

  pub fn bytes(&self) -> &[u8] {
    &self.data[..self.len]
  }
}

// Filter and wrap state last set on the native texture; `None` is unknown.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct LegacyState {
  min_filter: Option<MinFilter>,
  mag_filter: Option<MagFilter>,
  wrap_s: Option<WrapMode>,
  wrap_t: Option<WrapMode>,
  wrap_r: Option<WrapMode>,
}

impl LegacyState {
  // Freshly generated textures start with linear filters and unknown wrap modes.
  fn generated() -> Self {
    LegacyState {
      min_filter: Some(MinFilter::Linear),
      mag_filter: Some(MagFilter::Linear),
      ..LegacyState::default()
    }
  }
}

/// A texture of a given shape.
pub struct Texture<B, S>
where
  B: Backend,
  S: TextureShape,
{
  backend: Rc<RefCell<B>>,
  capabilities: Capabilities,
  size: S::Size,
  loader_kind: LoaderKind,
  pending: Option<TextureLoader<S, B::TextureRepr>>,
  requested_format: PixelFormat,
  internal_format: PixelFormat,
  native: Option<B::TextureRepr>,
  native_format: Option<NativeFormat>,
  is_foreign: bool,
  legacy: LegacyState,
  first_pixel: Option<FirstPixel>,
}

impl<B, S> Texture<B, S>
where
  B: Backend,
  S: TextureShape,
{
  pub(crate) fn new(
    backend: Rc<RefCell<B>>,
    capabilities: Capabilities,
    loader: TextureLoader<S, B::TextureRepr>,
    format: PixelFormat,
  ) -> Self {
    Texture {
      backend,
      capabilities,
      size: loader.size(),
      loader_kind: loader.kind(),
      pending: Some(loader),
      requested_format: format,
      internal_format: format,
      native: None,
      native_format: None,
      is_foreign: false,
      legacy: LegacyState::default(),
      first_pixel: None,
    }
  }

  pub fn size(&self) -> S::Size {
    self.size
  }

  pub fn width(&self) -> u32 {
    S::extent(self.size)[0]
  }

  pub fn height(&self) -> u32 {
    S::extent(self.size)[1]
  }

  pub fn depth(&self) -> u32 {
    S::extent(self.size)[2]
  }

  /// Storage format; [`PixelFormat::Any`] is only possible before allocation.
  pub fn internal_format(&self) -> PixelFormat {
    self.internal_format
  }

  pub fn native_handle(&self) -> Option<B::TextureRepr> {
    self.native
  }

  pub fn native_format(&self) -> Option<NativeFormat> {
    self.native_format
  }

  pub fn loader_kind(&self) -> LoaderKind {
    self.loader_kind
  }

  /// Whether the native handle belongs to the caller.
  pub fn is_foreign(&self) -> bool {
    self.is_foreign
  }

  pub fn is_allocated(&self) -> bool {
    self.native.is_some()
  }

  /// Copy of the first pixel kept for mipmap regeneration, if any.
  pub fn first_pixel(&self) -> Option<&FirstPixel> {
    self.first_pixel.as_ref()
  }

  /// Allocate the native texture.
  ///
  /// Allocating an already allocated texture does nothing. On failure, no native handle created
  /// along the way survives and the texture can be allocated again later.
  pub fn allocate(&mut self) -> Result<(), Error> {
    if self.native.is_some() {
      return Ok(());
    }

    let loader = match self.pending.take() {
      Some(loader) => loader,
      None => {
        return Err(Error::unsupported(
          ErrorDomain::Texture,
          format!("{} has nothing to allocate from", S::TARGET),
        ))
      }
    };

    let result = match loader {
      TextureLoader::Sized(size) => self.allocate_with_size(size),
      TextureLoader::Bitmap { ref bitmap, size } => self.allocate_from_bitmap(bitmap, size),
      TextureLoader::Foreign {
        handle,
        size,
        format,
      } => self.allocate_from_foreign(handle, size, format),
    };

    match result {
      Ok(()) => Ok(()),

      Err(e) => {
        warn!("cannot allocate {}: {}", S::TARGET, e);
        self.pending = Some(loader);
        Err(e)
      }
    }
  }

  fn translate(backend: &B, format: PixelFormat) -> Result<NativeFormat, Error> {
    backend.native_format(format).ok_or_else(|| {
      Error::unsupported(
        ErrorDomain::Texture,
        format!("{:?} has no native representation", format),
      )
    })
  }

  // Feature, size and format checks shared by the sized and bitmap paths.
  fn can_create(&self, backend: &mut B, format: &NativeFormat, extent: [u32; 3]) -> Result<(), Error> {
    if !self.capabilities.has_feature(S::REQUIRED_FEATURE) {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!("{}s are not supported by the backend", S::TARGET),
      ));
    }

    if S::NPOT_RESTRICTED
      && !self.capabilities.has_feature(Features::TEXTURE_NPOT)
      && !extent.iter().all(|&n| is_pot(n))
    {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!(
          "{} size {:?} is not a power of two and the backend lacks NPOT support",
          S::TARGET,
          extent
        ),
      ));
    }

    let max = S::max_extent(&self.capabilities.limits);
    let fits = extent.iter().all(|&n| n > 0 && n <= max)
      && unsafe { backend.size_supported(S::TARGET, format, extent) };

    if !fits {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!(
          "failed to create {} due to size / format constraints ({:?})",
          S::TARGET,
          extent
        ),
      ));
    }

    Ok(())
  }

  fn allocate_with_size(&mut self, size: S::Size) -> Result<(), Error> {
    let backend = Rc::clone(&self.backend);
    let mut backend = backend.borrow_mut();
    let extent = S::extent(size);

    let internal_format = determine_internal_format(self.requested_format, None);
    let native_format = Self::translate(&backend, internal_format)?;
    self.can_create(&mut backend, &native_format, extent)?;

    let handle = unsafe { backend.gen_texture(S::TARGET) };

    if let Err(e) = unsafe { backend.texture_storage(S::TARGET, handle, &native_format, extent) } {
      unsafe { backend.delete_texture(S::TARGET, handle) };
      return Err(e);
    }

    self.native = Some(handle);
    self.native_format = Some(native_format);
    self.internal_format = internal_format;
    self.legacy = LegacyState::generated();

    Ok(())
  }

  fn allocate_from_bitmap(&mut self, bitmap: &Bitmap, size: S::Size) -> Result<(), Error> {
    let backend = Rc::clone(&self.backend);
    let mut backend = backend.borrow_mut();
    let extent = S::extent(size);

    if bitmap.width() != extent[0] || (bitmap.height() as u64) < extent[1] as u64 * extent[2] as u64 {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!(
          "a {}x{} bitmap cannot fill a {} of size {:?}",
          bitmap.width(),
          bitmap.height(),
          S::TARGET,
          extent
        ),
      ));
    }

    let internal_format = determine_internal_format(self.requested_format, Some(bitmap.format()));
    let native_format = Self::translate(&backend, internal_format)?;
    let upload_format = Self::translate(&backend, bitmap.format())?;
    self.can_create(&mut backend, &native_format, extent)?;

    // keep the first pixel around to regenerate mipmaps without native support
    let first_pixel = if S::MIPMAPS && !self.capabilities.has_feature(Features::OFFSCREEN) {
      bitmap
        .first_pixel()
        .and_then(|bytes| FirstPixel::new(upload_format, bytes))
    } else {
      None
    };

    let handle = unsafe { backend.gen_texture(S::TARGET) };

    if let Err(e) = unsafe {
      backend.texture_upload(
        S::TARGET,
        handle,
        &native_format,
        &upload_format,
        bitmap,
        extent,
      )
    } {
      unsafe { backend.delete_texture(S::TARGET, handle) };
      return Err(e);
    }

    self.native = Some(handle);
    self.native_format = Some(native_format);
    self.internal_format = internal_format;
    self.legacy = LegacyState::generated();
    self.first_pixel = first_pixel;

    Ok(())
  }

  fn allocate_from_foreign(
    &mut self,
    handle: B::TextureRepr,
    size: S::Size,
    format: PixelFormat,
  ) -> Result<(), Error> {
    let backend = Rc::clone(&self.backend);
    let mut backend = backend.borrow_mut();

    if !S::FOREIGN || !self.capabilities.has_feature(Features::FOREIGN_TEXTURES) {
      return Err(Error::unsupported(
        ErrorDomain::System,
        format!("foreign {}s are not supported by the backend", S::TARGET),
      ));
    }

    if S::extent(size).iter().any(|&n| n == 0) {
      return Err(Error::invalid_foreign_object(format!(
        "foreign {} has an empty size",
        S::TARGET
      )));
    }

    unsafe { backend.bind_foreign(S::TARGET, handle)? };

    let (format, native_format) =
      if self.capabilities.has_feature(Features::QUERY_TEXTURE_PARAMETERS) {
        let info = unsafe { backend.query_texture_parameters(S::TARGET, handle) };

        if info.compressed {
          return Err(Error::invalid_foreign_object(
            "compressed foreign textures are not supported",
          ));
        }

        // what the driver reports wins over what we were told
        match info.internal_format {
          Some(internal) => {
            let format = backend.pixel_format_from_internal(internal).ok_or_else(|| {
              Error::invalid_foreign_object(format!(
                "unsupported internal format {:#x} for foreign texture",
                internal
              ))
            })?;
            let native_format = backend.native_format(format);
            (format, native_format)
          }

          None => (format, backend.native_format(format)),
        }
      } else {
        (format, backend.native_format(format))
      };

    if format == PixelFormat::Any {
      return Err(Error::invalid_foreign_object(
        "the format of a foreign texture must be known",
      ));
    }

    self.native = Some(handle);
    self.native_format = native_format;
    self.internal_format = format;
    self.is_foreign = true;
    self.legacy = LegacyState::default();

    Ok(())
  }

  fn handle(&self) -> B::TextureRepr {
    match self.native {
      Some(handle) => handle,
      None => panic!("{} used before being allocated", S::TARGET),
    }
  }

  /// Set the filters, unless they are already set.
  ///
  /// # Panics
  ///
  /// Panics if the texture is not allocated, or if a mipmap filter is used with a shape that has
  /// no mipmaps.
  pub fn flush_filters(&mut self, min_filter: MinFilter, mag_filter: MagFilter) {
    let handle = self.handle();

    assert!(
      !S::CLAMP_ONLY || !min_filter.uses_mipmaps(),
      "{}s cannot be sampled with mipmap filter {:?}",
      S::TARGET,
      min_filter
    );

    if self.legacy.min_filter == Some(min_filter) && self.legacy.mag_filter == Some(mag_filter) {
      return;
    }

    self.legacy.min_filter = Some(min_filter);
    self.legacy.mag_filter = Some(mag_filter);

    unsafe {
      self
        .backend
        .borrow_mut()
        .set_texture_filters(S::TARGET, handle, min_filter, mag_filter)
    };
  }

  /// Set the wrap modes, unless they are already set.
  ///
  /// Automatic wrap modes are resolved first. `wrap_r` is ignored for shapes without a third
  /// axis.
  ///
  /// # Panics
  ///
  /// Panics if the texture is not allocated, or if a repeating mode is used with a shape
  /// restricted to clamping.
  pub fn flush_wrap_modes(&mut self, wrap_s: WrapMode, wrap_t: WrapMode, wrap_r: WrapMode) {
    let handle = self.handle();

    assert!(
      !S::CLAMP_ONLY || (wrap_s.is_clamp() && wrap_t.is_clamp()),
      "{}s only support clamping wrap modes, got {:?} / {:?}",
      S::TARGET,
      wrap_s,
      wrap_t
    );

    let wrap_s = wrap_s.resolve();
    let wrap_t = wrap_t.resolve();
    let wrap_r = if S::WRAP_R {
      Some(wrap_r.resolve())
    } else {
      None
    };

    if self.legacy.wrap_s == Some(wrap_s)
      && self.legacy.wrap_t == Some(wrap_t)
      && (!S::WRAP_R || self.legacy.wrap_r == wrap_r)
    {
      return;
    }

    self.legacy.wrap_s = Some(wrap_s);
    self.legacy.wrap_t = Some(wrap_t);
    self.legacy.wrap_r = wrap_r;

    unsafe {
      self
        .backend
        .borrow_mut()
        .set_texture_wrap_modes(S::TARGET, handle, wrap_s, wrap_t, wrap_r)
    };
  }

  /// Check that a sampler state can be used with this shape.
  ///
  /// # Panics
  ///
  /// Panics on the same conditions as [`Texture::flush_filters`] and
  /// [`Texture::flush_wrap_modes`].
  pub fn check_sampler_state(&self, state: &SamplerState) {
    if S::CLAMP_ONLY {
      assert!(
        !state.min_filter.uses_mipmaps() && state.wrap_s.is_clamp() && state.wrap_t.is_clamp(),
        "{}s cannot be sampled with {:?}",
        S::TARGET,
        state
      );
    }
  }

  /// Regenerate the mipmap chain after the base level changed.
  ///
  /// Native generation is preferred; otherwise the first pixel is rewritten with automatic
  /// mipmap generation enabled. Shapes without mipmaps ignore the request.
  pub fn generate_mipmaps(&mut self) {
    if !S::MIPMAPS {
      return;
    }

    let handle = self.handle();
    let mut backend = self.backend.borrow_mut();

    if self.capabilities.has_feature(Features::OFFSCREEN) {
      unsafe { backend.generate_mipmap(S::TARGET, handle) };
    } else if self.capabilities.has_feature(Features::LEGACY_AUTO_MIPMAP) {
      match self.first_pixel {
        Some(ref first_pixel) => unsafe {
          backend.legacy_generate_mipmap(S::TARGET, handle, first_pixel)
        },

        None => warn!("no pixel to rewrite to regenerate the mipmaps of a {}", S::TARGET),
      }
    } else {
      warn!("the backend cannot generate mipmaps for a {}", S::TARGET);
    }
  }

  /// Bind the texture to a texture unit.
  pub(crate) fn bind(&self, backend: &mut B, unit: u32) {
    let handle = self.handle();
    unsafe { backend.bind_texture(unit, S::TARGET, handle) };
  }

  /// Release the texture.
  ///
  /// Owned native handles are deleted; foreign ones are left untouched.
  pub fn free(self) {}
}

impl<B, S> Drop for Texture<B, S>
where
  B: Backend,
  S: TextureShape,
{
  fn drop(&mut self) {
    if self.is_foreign {
      return;
    }

    if let Some(handle) = self.native.take() {
      unsafe { self.backend.borrow_mut().delete_texture(S::TARGET, handle) };
    }
  }
}

impl<B, S> fmt::Debug for Texture<B, S>
where
  B: Backend,
  S: TextureShape,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Texture")
      .field("target", &S::TARGET)
      .field("size", &self.size)
      .field("internal_format", &self.internal_format)
      .field("native", &self.native)
      .field("is_foreign", &self.is_foreign)
      .finish()
  }
}
