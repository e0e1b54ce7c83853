//! Pixel format translation backend interface.

use crate::pixel::{NativeFormat, PixelFormat};

/// Pixel format translation.
pub unsafe trait Pixel {
  /// Translate a pixel format into its native representation.
  ///
  /// `None` means the format cannot be represented natively; callers treat it as unsupported.
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat>;

  /// Translate a native internal format back into a pixel format.
  ///
  /// Used when adopting foreign textures whose internal format was queried.
  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    let _ = internal;
    None
  }
}
