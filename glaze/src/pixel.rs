//! Pixel formats.
//!
//! [`PixelFormat`] is the backend-agnostic description of how texels are laid out in memory.
//! Backends translate it into a [`NativeFormat`], an opaque triple only the backend understands.

/// Pixel format of texels in memory.
///
/// Multi-byte formats are described in memory order, so [`PixelFormat::Rgba8888`] stores red in
/// the first byte. Packed 16-bit formats are described from the most significant bit down.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
  /// Single 8-bit alpha channel.
  A8,
  /// Two 8-bit channels.
  Rg88,
  /// Packed 16-bit RGB.
  Rgb565,
  /// 8-bit red, green and blue.
  Rgb888,
  /// 8-bit blue, green and red.
  Bgr888,
  /// 8-bit red, green, blue and alpha.
  Rgba8888,
  /// 8-bit red, green, blue and premultiplied alpha.
  Rgba8888Pre,
  /// 8-bit blue, green, red and alpha.
  Bgra8888,
  /// 8-bit blue, green, red and premultiplied alpha.
  Bgra8888Pre,
  /// Packed 16-bit RGBA, four bits per channel.
  Rgba4444,
  /// Packed 16-bit RGBA, five bits per color channel and one alpha bit.
  Rgba5551,
  /// No preference; the format is derived from the source data.
  Any,
}

impl PixelFormat {
  /// Size of a single pixel in bytes.
  ///
  /// [`PixelFormat::Any`] has no size and yields `0`.
  pub fn bytes_per_pixel(self) -> usize {
    match self {
      PixelFormat::A8 => 1,
      PixelFormat::Rg88 | PixelFormat::Rgb565 | PixelFormat::Rgba4444 | PixelFormat::Rgba5551 => 2,
      PixelFormat::Rgb888 | PixelFormat::Bgr888 => 3,
      PixelFormat::Rgba8888
      | PixelFormat::Rgba8888Pre
      | PixelFormat::Bgra8888
      | PixelFormat::Bgra8888Pre => 4,
      PixelFormat::Any => 0,
    }
  }

  /// Whether the format carries an alpha channel.
  pub fn has_alpha(self) -> bool {
    matches!(
      self,
      PixelFormat::A8
        | PixelFormat::Rgba8888
        | PixelFormat::Rgba8888Pre
        | PixelFormat::Bgra8888
        | PixelFormat::Bgra8888Pre
        | PixelFormat::Rgba4444
        | PixelFormat::Rgba5551
    )
  }

  /// Whether color channels are premultiplied by alpha.
  pub fn is_premultiplied(self) -> bool {
    matches!(self, PixelFormat::Rgba8888Pre | PixelFormat::Bgra8888Pre)
  }
}

/// Backend representation of a pixel format.
///
/// The three values are opaque to the core and only meaningful to the backend which produced them
/// (for instance, GL's internal format, pixel transfer format and component type).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NativeFormat {
  /// Format of the texture storage.
  pub internal: u32,
  /// Format of the texels when transferred.
  pub transfer: u32,
  /// Type of each transferred component.
  pub component_type: u32,
}

impl NativeFormat {
  /// Create a native format.
  pub const fn new(internal: u32, transfer: u32, component_type: u32) -> Self {
    NativeFormat {
      internal,
      transfer,
      component_type,
    }
  }
}

/// Choose the storage format of a texture.
///
/// An explicit request wins; otherwise the format of the source is kept, and sized textures with
/// no source default to premultiplied RGBA.
pub fn determine_internal_format(requested: PixelFormat, source: Option<PixelFormat>) -> PixelFormat {
  match (requested, source) {
    (PixelFormat::Any, Some(source)) if source != PixelFormat::Any => source,
    (PixelFormat::Any, _) => PixelFormat::Rgba8888Pre,
    (requested, _) => requested,
  }
}
