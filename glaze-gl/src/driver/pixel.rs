//! Pixel format tables.
//!
//! Desktop contexts get sized internal formats. OpenGL ES 2 requires the internal format to match
//! the transfer format, which leaves out every format needing a swizzle on upload.

use gl::types::*;
use glaze::backend::pixel::Pixel;
use glaze::pixel::{NativeFormat, PixelFormat};

use crate::driver::{Flavor, Gl};

// unsized formats of OpenGL ES, missing from core profile bindings
const GL_ALPHA: GLenum = 0x1906;
const GL_LUMINANCE: GLenum = 0x1909;

fn format(internal: GLenum, transfer: GLenum, component_type: GLenum) -> NativeFormat {
  NativeFormat::new(internal, transfer, component_type)
}

pub(crate) fn desktop_format(pf: PixelFormat) -> Option<NativeFormat> {
  let f = match pf {
    // alpha lives in the red channel and is swizzled back on allocation
    PixelFormat::A8 => format(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
    PixelFormat::Rg88 => format(gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
    PixelFormat::Rgb565 => format(gl::RGB565, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
    PixelFormat::Rgb888 => format(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
    PixelFormat::Bgr888 => format(gl::RGB8, gl::BGR, gl::UNSIGNED_BYTE),
    PixelFormat::Rgba8888 | PixelFormat::Rgba8888Pre => format(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
    PixelFormat::Bgra8888 | PixelFormat::Bgra8888Pre => format(gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
    PixelFormat::Rgba4444 => format(gl::RGBA4, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4),
    PixelFormat::Rgba5551 => format(gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
    PixelFormat::Any => return None,
  };

  Some(f)
}

pub(crate) fn embedded_format(pf: PixelFormat) -> Option<NativeFormat> {
  let f = match pf {
    PixelFormat::A8 => format(GL_ALPHA, GL_ALPHA, gl::UNSIGNED_BYTE),
    PixelFormat::Rgb565 => format(gl::RGB, gl::RGB, gl::UNSIGNED_SHORT_5_6_5),
    PixelFormat::Rgb888 => format(gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
    PixelFormat::Rgba8888 | PixelFormat::Rgba8888Pre => format(gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
    PixelFormat::Rgba4444 => format(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4),
    PixelFormat::Rgba5551 => format(gl::RGBA, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1),
    PixelFormat::Rg88 | PixelFormat::Bgr888 | PixelFormat::Bgra8888 | PixelFormat::Bgra8888Pre => {
      return None
    }
    PixelFormat::Any => return None,
  };

  Some(f)
}

/// Pixel format of a texture created elsewhere, from its internal format.
///
/// Color formats are assumed premultiplied, which is what the library renders with.
pub(crate) fn format_from_internal(internal: GLenum) -> Option<PixelFormat> {
  match internal {
    gl::R8 | GL_ALPHA | GL_LUMINANCE => Some(PixelFormat::A8),
    gl::RG8 => Some(PixelFormat::Rg88),
    gl::RGB565 => Some(PixelFormat::Rgb565),
    gl::RGB8 | gl::RGB => Some(PixelFormat::Rgb888),
    gl::RGBA8 | gl::RGBA => Some(PixelFormat::Rgba8888Pre),
    gl::RGBA4 => Some(PixelFormat::Rgba4444),
    gl::RGB5_A1 => Some(PixelFormat::Rgba5551),
    _ => None,
  }
}

unsafe impl<F> Pixel for Gl<F>
where
  F: Flavor,
{
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
    if F::EMBEDDED {
      embedded_format(format)
    } else {
      desktop_format(format)
    }
  }

  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    format_from_internal(internal)
  }
}
