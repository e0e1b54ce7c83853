//! Pixel formats.
//!
//! wgpu has no packed 16-bit nor 24-bit color formats; those translate to `None`. Native formats
//! carry a small code identifying the [`wgpu::TextureFormat`] in their `internal` and `transfer`
//! fields, and the size of a texel in `component_type`.

use glaze::backend::pixel::Pixel;
use glaze::pixel::{NativeFormat, PixelFormat};

use crate::device::Wgpu;

// texture formats by native code; code 0 is reserved for formats glaze can't represent
const TEXTURE_FORMATS: [wgpu::TextureFormat; 4] = [
  wgpu::TextureFormat::R8Unorm,
  wgpu::TextureFormat::Rg8Unorm,
  wgpu::TextureFormat::Rgba8Unorm,
  wgpu::TextureFormat::Bgra8Unorm,
];

/// Code of a texture format; `0` if it's unknown.
pub(crate) fn format_code(format: wgpu::TextureFormat) -> u32 {
  TEXTURE_FORMATS
    .iter()
    .position(|f| *f == format)
    .map_or(0, |i| i as u32 + 1)
}

pub(crate) fn texture_format(code: u32) -> Option<wgpu::TextureFormat> {
  let index = code.checked_sub(1)?;
  TEXTURE_FORMATS.get(index as usize).copied()
}

pub(crate) fn native_format(pf: PixelFormat) -> Option<NativeFormat> {
  let format = match pf {
    PixelFormat::A8 => wgpu::TextureFormat::R8Unorm,
    PixelFormat::Rg88 => wgpu::TextureFormat::Rg8Unorm,
    PixelFormat::Rgba8888 | PixelFormat::Rgba8888Pre => wgpu::TextureFormat::Rgba8Unorm,
    PixelFormat::Bgra8888 | PixelFormat::Bgra8888Pre => wgpu::TextureFormat::Bgra8Unorm,
    _ => return None,
  };

  let code = format_code(format);
  Some(NativeFormat::new(code, code, pf.bytes_per_pixel() as u32))
}

pub(crate) fn format_from_internal(internal: u32) -> Option<PixelFormat> {
  match texture_format(internal)? {
    wgpu::TextureFormat::R8Unorm => Some(PixelFormat::A8),
    wgpu::TextureFormat::Rg8Unorm => Some(PixelFormat::Rg88),
    wgpu::TextureFormat::Rgba8Unorm => Some(PixelFormat::Rgba8888Pre),
    wgpu::TextureFormat::Bgra8Unorm => Some(PixelFormat::Bgra8888Pre),
    _ => None,
  }
}

unsafe impl Pixel for Wgpu {
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
    native_format(format)
  }

  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    format_from_internal(internal)
  }
}
