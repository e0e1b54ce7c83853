//! Backend features and limits.
//!
//! Features are detected once by the backend when a [`Context`] is created and cached afterwards;
//! asking whether a feature is available never reaches the backend again.
//!
//! [`Context`]: crate::context::Context

use bitflags::bitflags;

bitflags! {
  /// Optional capabilities a backend might expose.
  #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
  pub struct Features: u32 {
    /// Textures with non-power-of-two sizes.
    const TEXTURE_NPOT = 1 << 0;
    /// 3D textures.
    const TEXTURE_3D = 1 << 1;
    /// Rectangle textures (non-normalized coordinates).
    const TEXTURE_RECTANGLE = 1 << 2;
    /// Offscreen rendering, which also provides native mipmap generation.
    const OFFSCREEN = 1 << 3;
    /// Sampler objects, separated from textures.
    const SAMPLER_OBJECTS = 1 << 4;
    /// Texture parameters (compression, internal format) can be queried back.
    const QUERY_TEXTURE_PARAMETERS = 1 << 5;
    /// Fixed-function automatic mipmap generation on texel upload.
    const LEGACY_AUTO_MIPMAP = 1 << 6;
    /// An auxiliary per-pixel mask plane is available for clipping.
    const STENCIL_MASK = 1 << 7;
    /// Textures created outside of the library can be adopted.
    const FOREIGN_TEXTURES = 1 << 8;
    /// The driver mishandles scissoring outside of the viewport; clip against the viewport too.
    const VIEWPORT_SCISSOR_WORKAROUND = 1 << 9;
  }
}

/// Size limits reported by a backend.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Limits {
  /// Maximum width / height of 2D textures.
  pub max_texture_size: u32,
  /// Maximum width / height / depth of 3D textures.
  pub max_3d_texture_size: u32,
  /// Maximum width / height of rectangle textures.
  pub max_rectangle_texture_size: u32,
}

impl Default for Limits {
  fn default() -> Self {
    // minimal guarantees of the most limited backends we target
    Limits {
      max_texture_size: 2048,
      max_3d_texture_size: 256,
      max_rectangle_texture_size: 2048,
    }
  }
}

/// What a backend reports when detecting its features.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capabilities {
  /// Available features.
  pub features: Features,
  /// Size limits.
  pub limits: Limits,
}

impl Capabilities {
  /// Create a new set of capabilities.
  pub fn new(features: Features, limits: Limits) -> Self {
    Capabilities { features, limits }
  }

  /// Check whether a feature (or set of features) is available.
  pub fn has_feature(&self, feature: Features) -> bool {
    self.features.contains(feature)
  }
}
