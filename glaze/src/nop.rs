//! No-op backend.
//!
//! [`Nop`] accepts everything and draws nothing. It's useful to run code depending on a
//! [`Context`](crate::context::Context) without any graphics stack, for instance in tests.

use crate::backend::clip::Clip;
use crate::backend::features::Features as FeaturesBackend;
use crate::backend::pixel::Pixel;
use crate::backend::sampler::Sampler;
use crate::backend::texture::Texture;
use crate::bitmap::Bitmap;
use crate::error::Error;
use crate::features::{Capabilities, Features, Limits};
use crate::pixel::{NativeFormat, PixelFormat};
use crate::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use crate::scissor::ScissorRegion;
use crate::texture::TextureTarget;

// Pixel formats in the order of their native codes.
const FORMATS: [PixelFormat; 11] = [
  PixelFormat::A8,
  PixelFormat::Rg88,
  PixelFormat::Rgb565,
  PixelFormat::Rgb888,
  PixelFormat::Bgr888,
  PixelFormat::Rgba8888,
  PixelFormat::Rgba8888Pre,
  PixelFormat::Bgra8888,
  PixelFormat::Bgra8888Pre,
  PixelFormat::Rgba4444,
  PixelFormat::Rgba5551,
];

/// Backend doing nothing.
#[derive(Debug, Default)]
pub struct Nop {
  next_texture: u32,
}

impl Nop {
  pub fn new() -> Self {
    Self::default()
  }
}

unsafe impl FeaturesBackend for Nop {
  fn backend_name(&self) -> &'static str {
    "nop"
  }

  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error> {
    let features = Features::TEXTURE_NPOT
      | Features::TEXTURE_3D
      | Features::TEXTURE_RECTANGLE
      | Features::FOREIGN_TEXTURES;
    let limits = Limits {
      max_texture_size: u32::MAX,
      max_3d_texture_size: u32::MAX,
      max_rectangle_texture_size: u32::MAX,
    };

    Ok(Capabilities::new(features, limits))
  }
}

unsafe impl Pixel for Nop {
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
    let code = FORMATS.iter().position(|f| *f == format)? as u32;
    Some(NativeFormat::new(code, code, 0))
  }

  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    FORMATS.get(internal as usize).copied()
  }
}

unsafe impl Sampler for Nop {
  type SamplerRepr = ();

  unsafe fn create_sampler(&mut self, _: &SamplerState) {}

  unsafe fn destroy_sampler(&mut self, _: ()) {}

  unsafe fn bind_sampler(&mut self, _: u32, _: ()) {}
}

unsafe impl Texture for Nop {
  type TextureRepr = u32;

  unsafe fn gen_texture(&mut self, _: TextureTarget) -> u32 {
    self.next_texture += 1;
    self.next_texture
  }

  unsafe fn delete_texture(&mut self, _: TextureTarget, _: u32) {}

  unsafe fn size_supported(&mut self, _: TextureTarget, _: &NativeFormat, _: [u32; 3]) -> bool {
    true
  }

  unsafe fn texture_storage(
    &mut self,
    _: TextureTarget,
    _: u32,
    _: &NativeFormat,
    _: [u32; 3],
  ) -> Result<(), Error> {
    Ok(())
  }

  unsafe fn texture_upload(
    &mut self,
    _: TextureTarget,
    _: u32,
    _: &NativeFormat,
    _: &NativeFormat,
    _: &Bitmap,
    _: [u32; 3],
  ) -> Result<(), Error> {
    Ok(())
  }

  unsafe fn bind_foreign(&mut self, _: TextureTarget, _: u32) -> Result<(), Error> {
    Ok(())
  }

  unsafe fn set_texture_filters(&mut self, _: TextureTarget, _: u32, _: MinFilter, _: MagFilter) {}

  unsafe fn set_texture_wrap_modes(
    &mut self,
    _: TextureTarget,
    _: u32,
    _: WrapMode,
    _: WrapMode,
    _: Option<WrapMode>,
  ) {
  }

  unsafe fn bind_texture(&mut self, _: u32, _: TextureTarget, _: u32) {}
}

unsafe impl Clip for Nop {
  unsafe fn set_scissor(&mut self, _: Option<ScissorRegion>) {}
}
