//! Sampler state: filters and wrap modes.

use std::hash::{Hash, Hasher};

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
  /// Select the nearest mipmap and perform a nearest interpolation in it.
  NearestMipmapNearest,
  /// Select the nearest mipmap and perform a linear interpolation in it.
  LinearMipmapNearest,
  /// Interpolate linearly between two mipmaps sampled with a nearest filter.
  NearestMipmapLinear,
  /// Interpolate linearly between two mipmaps sampled with a linear filter.
  LinearMipmapLinear,
}

impl MinFilter {
  /// Does sampling with this filter read mipmap levels?
  pub fn uses_mipmaps(self) -> bool {
    !matches!(self, MinFilter::Nearest | MinFilter::Linear)
  }
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  /// Nearest interpolation.
  Nearest,
  /// Linear interpolation between surrounding pixels.
  Linear,
}

/// How texture coordinates outside of *[0;1]* are handled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WrapMode {
  /// Coordinates are repeated.
  Repeat,
  /// Coordinates are repeated, alternating between *[0;1]* and *[1;0]*.
  MirroredRepeat,
  /// Coordinates are clamped to the edge texels.
  ClampToEdge,
  /// Coordinates outside of the texture sample the border color.
  ClampToBorder,
  /// Let the library pick; resolves to [`WrapMode::ClampToEdge`] natively.
  Automatic,
}

impl WrapMode {
  /// Native wrap mode this mode is realized with.
  pub fn resolve(self) -> WrapMode {
    match self {
      WrapMode::Automatic => WrapMode::ClampToEdge,
      mode => mode,
    }
  }

  /// Whether the mode belongs to the clamp family (including automatic).
  pub fn is_clamp(self) -> bool {
    matches!(
      self,
      WrapMode::ClampToEdge | WrapMode::ClampToBorder | WrapMode::Automatic
    )
  }
}

/// Complete sampling state.
///
/// Hashing visits the five fields in a fixed order through the one-at-a-time hasher used by the
/// sampler cache.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SamplerState {
  pub min_filter: MinFilter,
  pub mag_filter: MagFilter,
  pub wrap_s: WrapMode,
  pub wrap_t: WrapMode,
  pub wrap_r: WrapMode,
}

impl SamplerState {
  /// Linear filtering, automatic wrapping on every axis.
  pub const DEFAULT: SamplerState = SamplerState {
    min_filter: MinFilter::Linear,
    mag_filter: MagFilter::Linear,
    wrap_s: WrapMode::Automatic,
    wrap_t: WrapMode::Automatic,
    wrap_r: WrapMode::Automatic,
  };

  /// Same state with automatic wrap modes resolved to their native counterpart.
  pub fn canonical(&self) -> SamplerState {
    SamplerState {
      wrap_s: self.wrap_s.resolve(),
      wrap_t: self.wrap_t.resolve(),
      wrap_r: self.wrap_r.resolve(),
      ..*self
    }
  }

  /// Whether any wrap mode is automatic.
  pub fn has_automatic_wrap(&self) -> bool {
    [self.wrap_s, self.wrap_t, self.wrap_r].contains(&WrapMode::Automatic)
  }
}

impl Default for SamplerState {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl Hash for SamplerState {
  fn hash<H>(&self, state: &mut H)
  where
    H: Hasher,
  {
    self.min_filter.hash(state);
    self.mag_filter.hash(state);
    self.wrap_s.hash(state);
    self.wrap_t.hash(state);
    self.wrap_r.hash(state);
  }
}
