//! DRM pixel formats.
//!
//! DRM describes formats with little-endian four character codes, and names channels from the
//! most significant bit of the little-endian word down. glaze names them in memory order, so
//! [`PixelFormat::Rgba8888`] (red in the first byte) is `ABGR8888`.
//!
//! Native formats carry the fourcc in both their `internal` and `transfer` fields, and the size of
//! a pixel in `component_type`. Dumb buffers hold no premultiplication flag; the straight and
//! premultiplied variants of a format share their fourcc, and adopted buffers are assumed to be
//! premultiplied.

use glaze::backend::pixel::Pixel;
use glaze::pixel::{NativeFormat, PixelFormat};
use std::fmt;

use crate::device::Kms;

/// Four character code of a DRM pixel format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Fourcc(pub u32);

impl Fourcc {
  pub const R8: Fourcc = Fourcc::new(b"R8  ");
  pub const GR88: Fourcc = Fourcc::new(b"GR88");
  pub const RGB565: Fourcc = Fourcc::new(b"RG16");
  pub const BGR888: Fourcc = Fourcc::new(b"BG24");
  pub const RGB888: Fourcc = Fourcc::new(b"RG24");
  pub const ABGR8888: Fourcc = Fourcc::new(b"AB24");
  pub const ARGB8888: Fourcc = Fourcc::new(b"AR24");
  pub const RGBA4444: Fourcc = Fourcc::new(b"RA12");
  pub const RGBA5551: Fourcc = Fourcc::new(b"RA15");

  pub const fn new(code: &[u8; 4]) -> Self {
    Fourcc(u32::from_le_bytes(*code))
  }
}

impl fmt::Display for Fourcc {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let bytes = self.0.to_le_bytes();
    f.write_str(String::from_utf8_lossy(&bytes).trim_end())
  }
}

pub(crate) fn fourcc(format: PixelFormat) -> Option<Fourcc> {
  match format {
    PixelFormat::A8 => Some(Fourcc::R8),
    PixelFormat::Rg88 => Some(Fourcc::GR88),
    PixelFormat::Rgb565 => Some(Fourcc::RGB565),
    PixelFormat::Rgb888 => Some(Fourcc::BGR888),
    PixelFormat::Bgr888 => Some(Fourcc::RGB888),
    PixelFormat::Rgba8888 | PixelFormat::Rgba8888Pre => Some(Fourcc::ABGR8888),
    PixelFormat::Bgra8888 | PixelFormat::Bgra8888Pre => Some(Fourcc::ARGB8888),
    PixelFormat::Rgba4444 => Some(Fourcc::RGBA4444),
    PixelFormat::Rgba5551 => Some(Fourcc::RGBA5551),
    PixelFormat::Any => None,
  }
}

pub(crate) fn pixel_format(code: Fourcc) -> Option<PixelFormat> {
  match code {
    Fourcc::R8 => Some(PixelFormat::A8),
    Fourcc::GR88 => Some(PixelFormat::Rg88),
    Fourcc::RGB565 => Some(PixelFormat::Rgb565),
    Fourcc::BGR888 => Some(PixelFormat::Rgb888),
    Fourcc::RGB888 => Some(PixelFormat::Bgr888),
    Fourcc::ABGR8888 => Some(PixelFormat::Rgba8888Pre),
    Fourcc::ARGB8888 => Some(PixelFormat::Bgra8888Pre),
    Fourcc::RGBA4444 => Some(PixelFormat::Rgba4444),
    Fourcc::RGBA5551 => Some(PixelFormat::Rgba5551),
    _ => None,
  }
}

/// Bytes per pixel of a format known to the backend.
pub(crate) fn bytes_per_pixel(code: Fourcc) -> Option<u32> {
  pixel_format(code).map(|pf| pf.bytes_per_pixel() as u32)
}

unsafe impl Pixel for Kms {
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
    let code = fourcc(format)?;
    Some(NativeFormat::new(code.0, code.0, format.bytes_per_pixel() as u32))
  }

  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    pixel_format(Fourcc(internal))
  }
}
