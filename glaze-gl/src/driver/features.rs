//! Version parsing and feature detection.

use gl::types::*;
use glaze::backend::features::Features as FeaturesBackend;
use glaze::features::{Capabilities, Features, Limits};
use glaze::Error;
use log::debug;
use std::collections::HashSet;
use std::ffi::CStr;
use std::fmt;

use crate::driver::state::StateQueryError;
use crate::driver::{catch_any_error, get_string, Flavor, Gl};

// not exposed by core profile bindings
const GL_STENCIL_BITS: GLenum = 0x0D57;

/// Version of a GL context.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GlVersion {
  pub major: u32,
  pub minor: u32,
  /// OpenGL ES context.
  pub embedded: bool,
}

impl GlVersion {
  pub fn new(major: u32, minor: u32, embedded: bool) -> Self {
    GlVersion {
      major,
      minor,
      embedded,
    }
  }

  /// Whether this version is at least `major.minor`.
  pub fn at_least(&self, major: u32, minor: u32) -> bool {
    (self.major, self.minor) >= (major, minor)
  }
}

impl fmt::Display for GlVersion {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.embedded {
      write!(f, "OpenGL ES {}.{}", self.major, self.minor)
    } else {
      write!(f, "OpenGL {}.{}", self.major, self.minor)
    }
  }
}

/// Parse a `GL_VERSION` string.
///
/// Desktop strings start with the version (`"4.6.0 NVIDIA 535.54"`); OpenGL ES strings start with
/// `"OpenGL ES "` (`"OpenGL ES 3.2 Mesa 23.1"`).
pub fn parse_version(version: &str) -> Option<GlVersion> {
  let (rest, embedded) = match version.strip_prefix("OpenGL ES") {
    Some(rest) => {
      // OpenGL ES 1.x profiles are suffixed with -CM / -CL
      let rest = rest.trim_start_matches(|c: char| c == '-' || c.is_ascii_alphabetic());
      (rest.trim_start(), true)
    }
    None => (version, false),
  };

  let number = rest.split_whitespace().next()?;
  let mut parts = number.split('.');
  let major = parts.next()?.parse().ok()?;
  let minor = parts
    .next()?
    .trim_end_matches(|c: char| !c.is_ascii_digit())
    .parse()
    .ok()?;

  Some(GlVersion::new(major, minor, embedded))
}

/// Whether vertex array objects exist (and are required to draw) with this version.
pub(crate) fn has_vertex_arrays(version: GlVersion) -> bool {
  version.at_least(3, 0)
}

/// Compute the features of a context.
pub(crate) fn detect_features(
  version: GlVersion,
  extensions: &HashSet<String>,
  renderer: &str,
  stencil_bits: u32,
) -> Features {
  let has = |ext: &str| extensions.contains(ext);
  let mut features = Features::FOREIGN_TEXTURES;

  if version.embedded {
    features |= Features::OFFSCREEN;

    if version.at_least(3, 0) || has("GL_OES_texture_npot") || has("GL_ARB_texture_non_power_of_two") {
      features |= Features::TEXTURE_NPOT;
    }

    if version.at_least(3, 0) {
      features |= Features::TEXTURE_3D | Features::SAMPLER_OBJECTS;
    }
  } else {
    features |= Features::TEXTURE_3D | Features::QUERY_TEXTURE_PARAMETERS;

    if version.at_least(2, 0) || has("GL_ARB_texture_non_power_of_two") {
      features |= Features::TEXTURE_NPOT;
    }

    if version.at_least(3, 1) || has("GL_ARB_texture_rectangle") || has("GL_EXT_texture_rectangle") {
      features |= Features::TEXTURE_RECTANGLE;
    }

    if version.at_least(3, 0) || has("GL_ARB_framebuffer_object") {
      features |= Features::OFFSCREEN;
    }

    if version.at_least(3, 3) || has("GL_ARB_sampler_objects") {
      features |= Features::SAMPLER_OBJECTS;
    }

    // GL_GENERATE_MIPMAP is gone from 3.1 core contexts
    if !version.at_least(3, 1) {
      features |= Features::LEGACY_AUTO_MIPMAP;
    }
  }

  if stencil_bits > 0 {
    features |= Features::STENCIL_MASK;
  }

  if renderer.contains("Sandybridge") {
    features |= Features::VIEWPORT_SCISSOR_WORKAROUND;
  }

  features
}

pub(crate) unsafe fn query_version() -> Result<GlVersion, StateQueryError> {
  let version = get_string(gl::VERSION).unwrap_or_default();
  parse_version(&version).ok_or(StateQueryError::UnknownVersion(version))
}

unsafe fn query_extensions(version: GlVersion) -> HashSet<String> {
  if version.at_least(3, 0) {
    let mut count = 0;
    gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut count);

    (0..count.max(0) as GLuint)
      .filter_map(|i| {
        let ptr = gl::GetStringi(gl::EXTENSIONS, i);

        if ptr.is_null() {
          None
        } else {
          let name = CStr::from_ptr(ptr as *const _);
          Some(name.to_string_lossy().into_owned())
        }
      })
      .collect()
  } else {
    get_string(gl::EXTENSIONS)
      .unwrap_or_default()
      .split_whitespace()
      .map(str::to_owned)
      .collect()
  }
}

unsafe fn query_stencil_bits(version: GlVersion) -> u32 {
  let mut bits: GLint = 0;

  if !version.embedded && version.at_least(3, 0) {
    gl::GetFramebufferAttachmentParameteriv(
      gl::DRAW_FRAMEBUFFER,
      gl::STENCIL,
      gl::FRAMEBUFFER_ATTACHMENT_STENCIL_SIZE,
      &mut bits,
    );
  } else {
    gl::GetIntegerv(GL_STENCIL_BITS, &mut bits);
  }

  if catch_any_error() {
    0
  } else {
    bits.max(0) as u32
  }
}

unsafe fn query_limit(name: GLenum) -> u32 {
  let mut value: GLint = 0;
  gl::GetIntegerv(name, &mut value);
  value.max(0) as u32
}

unsafe fn query_limits(features: Features) -> Limits {
  let max_texture_size = query_limit(gl::MAX_TEXTURE_SIZE);

  let max_3d_texture_size = if features.contains(Features::TEXTURE_3D) {
    query_limit(gl::MAX_3D_TEXTURE_SIZE)
  } else {
    0
  };

  let max_rectangle_texture_size = if features.contains(Features::TEXTURE_RECTANGLE) {
    query_limit(gl::MAX_RECTANGLE_TEXTURE_SIZE)
  } else {
    0
  };

  catch_any_error();

  Limits {
    max_texture_size,
    max_3d_texture_size,
    max_rectangle_texture_size,
  }
}

unsafe impl<F> FeaturesBackend for Gl<F>
where
  F: Flavor,
{
  fn backend_name(&self) -> &'static str {
    F::NAME
  }

  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error> {
    let extensions = query_extensions(self.version);
    let renderer = get_string(gl::RENDERER).unwrap_or_default();
    let stencil_bits = query_stencil_bits(self.version);

    let features = detect_features(self.version, &extensions, &renderer, stencil_bits);
    let limits = query_limits(features);
    self.limits = limits;

    debug!(
      "{} on {:?}: {} extensions, {} stencil bits",
      self.version,
      renderer,
      extensions.len(),
      stencil_bits
    );

    Ok(Capabilities::new(features, limits))
  }
}
