//! GL driver shared by the desktop and embedded backends.
//!
//! The backend type is [`Gl`], generic over a [`Flavor`] selecting the GL dialect. Use the
//! [`GL33`] and [`GLES2`] aliases.

mod clip;
mod features;
mod pixel;
mod program;
mod sampler;
mod state;
mod stencil;
mod texture;

pub use self::features::{parse_version, GlVersion};
pub use self::state::{GLState, StateQueryError};

use gl::types::*;
use glaze::features::Limits;
use glaze::{Error, ErrorDomain, ErrorKind};
use log::warn;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;

use self::program::StencilProgram;

/// GL dialect.
pub trait Flavor: fmt::Debug + 'static {
  /// Name of the backend, as reported in logs.
  const NAME: &'static str;

  /// Whether the dialect is OpenGL ES.
  const EMBEDDED: bool;
}

/// Desktop OpenGL.
#[derive(Debug)]
pub struct Desktop;

impl Flavor for Desktop {
  const NAME: &'static str = "gl33";
  const EMBEDDED: bool = false;
}

/// OpenGL ES.
#[derive(Debug)]
pub struct Embedded;

impl Flavor for Embedded {
  const NAME: &'static str = "gles2";
  const EMBEDDED: bool = true;
}

/// An OpenGL backend.
#[derive(Debug)]
pub struct Gl<F>
where
  F: Flavor,
{
  state: GLState,
  version: GlVersion,
  limits: Limits,
  stencil_program: Option<StencilProgram>,
  _flavor: PhantomData<F>,
}

/// Desktop OpenGL backend.
pub type GL33 = Gl<Desktop>;

/// OpenGL ES backend.
pub type GLES2 = Gl<Embedded>;

impl<F> Gl<F>
where
  F: Flavor,
{
  /// Create a new backend from the GL context current on this thread.
  ///
  /// Only one backend can exist per thread.
  pub fn new() -> Result<Self, StateQueryError> {
    let version = unsafe { features::query_version()? };

    if version.embedded != F::EMBEDDED {
      return Err(StateQueryError::UnexpectedApi(version.to_string()));
    }

    if version.major < 2 {
      return Err(StateQueryError::UnsupportedVersion(version));
    }

    let state = GLState::new(features::has_vertex_arrays(version))?;

    Ok(Gl {
      state,
      version,
      limits: Limits::default(),
      stencil_program: None,
      _flavor: PhantomData,
    })
  }

  /// Version of the GL context.
  pub fn version(&self) -> GlVersion {
    self.version
  }

  /// Internal access to the backend state.
  ///
  /// # Unsafety
  ///
  /// Changing GL state behind the cache's back breaks redundant state suppression; invalidate
  /// what was touched afterwards.
  pub unsafe fn state(&mut self) -> &mut GLState {
    &mut self.state
  }
}

unsafe fn get_string(name: GLenum) -> Option<String> {
  let ptr = gl::GetString(name);

  if ptr.is_null() {
    None
  } else {
    Some(
      CStr::from_ptr(ptr as *const _)
        .to_string_lossy()
        .into_owned(),
    )
  }
}

/// Drain the GL error queue, reporting whether the driver ran out of memory.
///
/// Other errors are logged and otherwise ignored.
unsafe fn catch_out_of_memory() -> bool {
  let mut out_of_memory = false;

  loop {
    match gl::GetError() {
      gl::NO_ERROR => return out_of_memory,
      gl::OUT_OF_MEMORY => out_of_memory = true,
      e => warn!("GL error {:#x}", e),
    }
  }
}

/// Drain the GL error queue, reporting whether any error was raised.
unsafe fn catch_any_error() -> bool {
  let mut any = false;

  while gl::GetError() != gl::NO_ERROR {
    any = true;
  }

  any
}

impl From<StateQueryError> for Error {
  fn from(e: StateQueryError) -> Self {
    Error::new(ErrorDomain::Driver, ErrorKind::Unsupported, e.to_string())
  }
}
