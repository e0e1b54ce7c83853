//! Decoded pixel data.

use crate::error::{Error, ErrorDomain};
use crate::pixel::PixelFormat;

/// A block of decoded pixels in a known [`PixelFormat`].
///
/// Rows are `rowstride` bytes apart; only the first `width * bytes_per_pixel` bytes of each row
/// are meaningful. Volumetric data is stored as `depth` images of `height` rows stacked on top of
/// each other, so a bitmap used for a 3D texture is `height * depth` rows high.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bitmap {
  width: u32,
  height: u32,
  rowstride: usize,
  format: PixelFormat,
  data: Vec<u8>,
}

impl Bitmap {
  /// Create a bitmap with tightly packed rows.
  pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self, Error> {
    let rowstride = width as usize * format.bytes_per_pixel();
    Self::with_rowstride(width, height, rowstride, format, data)
  }

  /// Create a bitmap with an explicit rowstride.
  pub fn with_rowstride(
    width: u32,
    height: u32,
    rowstride: usize,
    format: PixelFormat,
    data: Vec<u8>,
  ) -> Result<Self, Error> {
    if format == PixelFormat::Any {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        "bitmaps must have a concrete pixel format",
      ));
    }

    let row_len = width as usize * format.bytes_per_pixel();

    if rowstride < row_len {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!("rowstride {} is smaller than a row ({} bytes)", rowstride, row_len),
      ));
    }

    let needed = match height {
      0 => 0,
      h => rowstride * (h as usize - 1) + row_len,
    };

    if data.len() < needed {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!("bitmap data holds {} bytes, {} needed", data.len(), needed),
      ));
    }

    Ok(Bitmap {
      width,
      height,
      rowstride,
      format,
      data,
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn rowstride(&self) -> usize {
    self.rowstride
  }

  pub fn format(&self) -> PixelFormat {
    self.format
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Bytes of the top-left pixel, if the bitmap is not empty.
  pub fn first_pixel(&self) -> Option<&[u8]> {
    let bpp = self.format.bytes_per_pixel();

    if self.width == 0 || self.height == 0 {
      None
    } else {
      self.data.get(..bpp)
    }
  }
}
