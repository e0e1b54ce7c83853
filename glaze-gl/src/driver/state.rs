//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

use crate::driver::features::GlVersion;

// at most one `GLState` per thread
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costly GPU commands if we know the target value is
/// already set to what the command tries to set. An empty cache is unknown and always invalid.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// A value nothing is known about.
  fn unknown() -> Self {
    Cached(None)
  }

  /// Forget the value, forcing the next set to reach GL.
  fn invalidate(&mut self) {
    self.0 = None;
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// Cache a value, returning the previously known one.
  fn replace(&mut self, value: T) -> Option<T> {
    self.0.replace(value)
  }

  /// Whether setting `new_val` needs a GL call.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

#[derive(Debug, PartialEq, Eq)]
struct StencilFunc {
  func: GLenum,
  reference: GLint,
  mask: GLuint,
}

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It acts as a forward-gate
/// to the low-level API but adds a small cache layer over it to prevent from issuing the same API
/// call (with the same parameters) twice.
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // texture
  current_texture_unit: Cached<GLenum>,
  bound_textures: Vec<(GLenum, GLuint)>,

  // sampler objects, per texture unit
  bound_samplers: Vec<GLuint>,

  // scissor
  scissor_test: Cached<bool>,
  scissor_box: Cached<[GLint; 4]>,

  // stencil
  stencil_test: Cached<bool>,
  stencil_func: Cached<StencilFunc>,
  stencil_op: Cached<GLenum>,
  stencil_write_mask: Cached<GLuint>,
  clear_stencil: Cached<GLint>,

  // color and depth writes
  color_depth_writes: Cached<bool>,

  // face culling
  face_culling: Cached<bool>,

  // array buffer
  bound_array_buffer: GLuint,

  // vertex array; `None` when the context has no vertex array objects
  bound_vertex_array: Option<GLuint>,

  // shader program
  current_program: GLuint,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new(vertex_arrays: bool) -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context(vertex_arrays)
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  /// Get a `GLState` from the current OpenGL context.
  fn get_from_context(vertex_arrays: bool) -> Result<Self, StateQueryError> {
    unsafe {
      let current_texture_unit = Cached::new(get_ctx_current_texture_unit()?);
      let bound_textures = vec![(gl::TEXTURE_2D, 0); 8]; // 8 is the smallest unit count around
      let bound_samplers = vec![0; 8];
      let scissor_test = Cached::new(get_ctx_scissor_test()?);
      let scissor_box = Cached::new(get_ctx_scissor_box()?);
      let stencil_test = Cached::new(get_ctx_stencil_test()?);
      let face_culling = Cached::new(get_ctx_face_culling()?);
      let bound_array_buffer = get_ctx_bound_array_buffer()?;
      let bound_vertex_array = if vertex_arrays {
        Some(get_ctx_bound_vertex_array()?)
      } else {
        None
      };
      let current_program = get_ctx_current_program()?;

      Ok(GLState {
        _a: PhantomData,
        current_texture_unit,
        bound_textures,
        bound_samplers,
        scissor_test,
        scissor_box,
        stencil_test,
        stencil_func: Cached::unknown(),
        stencil_op: Cached::unknown(),
        stencil_write_mask: Cached::unknown(),
        clear_stencil: Cached::unknown(),
        color_depth_writes: Cached::unknown(),
        face_culling,
        bound_array_buffer,
        bound_vertex_array,
        current_program,
      })
    }
  }

  /// Invalidate the currently in-use texture unit.
  pub fn invalidate_texture_unit(&mut self) {
    self.current_texture_unit.invalidate();
  }

  /// Invalidate the texture bindings.
  pub fn invalidate_bound_textures(&mut self) {
    for t in &mut self.bound_textures {
      *t = (gl::TEXTURE_2D, 0);
    }
  }

  /// Invalidate the sampler object bindings.
  pub fn invalidate_bound_samplers(&mut self) {
    for s in &mut self.bound_samplers {
      *s = 0;
    }
  }

  /// Invalidate the scissor state.
  pub fn invalidate_scissor(&mut self) {
    self.scissor_test.invalidate();
    self.scissor_box.invalidate();
  }

  /// Invalidate the stencil state, including the color and depth write masks.
  pub fn invalidate_stencil(&mut self) {
    self.stencil_test.invalidate();
    self.stencil_func.invalidate();
    self.stencil_op.invalidate();
    self.stencil_write_mask.invalidate();
    self.clear_stencil.invalidate();
    self.color_depth_writes.invalidate();
  }

  /// Invalidate the face culling state.
  pub fn invalidate_face_culling(&mut self) {
    self.face_culling.invalidate();
  }

  /// Invalidate the currently in-use shader program.
  pub fn invalidate_shader_program(&mut self) {
    self.current_program = 0;
  }

  /// Invalidate the currently in-use array buffer.
  pub fn invalidate_array_buffer(&mut self) {
    self.bound_array_buffer = 0;
  }

  /// Invalidate the currently in-use vertex array.
  pub fn invalidate_vertex_array(&mut self) {
    if let Some(ref mut vao) = self.bound_vertex_array {
      *vao = 0;
    }
  }

  pub(crate) fn create_texture(&mut self) -> GLuint {
    let mut texture = 0;

    unsafe { gl::GenTextures(1, &mut texture) };
    texture
  }

  pub(crate) unsafe fn delete_texture(&mut self, handle: GLuint) {
    gl::DeleteTextures(1, &handle);

    // deleted textures are unbound from every unit
    for t in &mut self.bound_textures {
      if t.1 == handle {
        *t = (gl::TEXTURE_2D, 0);
      }
    }
  }

  pub(crate) unsafe fn delete_sampler(&mut self, handle: GLuint) {
    gl::DeleteSamplers(1, &handle);

    for s in &mut self.bound_samplers {
      if *s == handle {
        *s = 0;
      }
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    let unit = unit as GLenum;

    if self.current_texture_unit.is_invalid(&unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
      self.current_texture_unit.set(unit);
    }
  }

  /// Bind a texture to the current texture unit.
  pub(crate) unsafe fn bind_texture(&mut self, target: GLenum, handle: GLuint) {
    let unit = match self.current_texture_unit.0 {
      Some(unit) => unit as usize,

      None => {
        self.set_texture_unit(0);
        0
      }
    };

    match self.bound_textures.get(unit).cloned() {
      Some((target_, handle_)) if target != target_ || handle != handle_ => {
        gl::BindTexture(target, handle);
        self.bound_textures[unit] = (target, handle);
      }

      None => {
        gl::BindTexture(target, handle);

        // unit never used so far
        self.bound_textures.resize(unit + 1, (gl::TEXTURE_2D, 0));
        self.bound_textures[unit] = (target, handle);
      }

      _ => (), // cached
    }
  }

  /// Forget what is bound to the current texture unit, so that the next bind always happens.
  pub(crate) fn forget_current_texture(&mut self) {
    if let Some(unit) = self.current_texture_unit.0 {
      if let Some(t) = self.bound_textures.get_mut(unit as usize) {
        *t = (gl::TEXTURE_2D, 0);
      }
    }
  }

  pub(crate) unsafe fn bind_sampler(&mut self, unit: u32, handle: GLuint) {
    let unit_ = unit as usize;

    match self.bound_samplers.get(unit_) {
      Some(&handle_) if handle == handle_ => (), // cached

      Some(_) => {
        gl::BindSampler(unit, handle);
        self.bound_samplers[unit_] = handle;
      }

      None => {
        gl::BindSampler(unit, handle);

        self.bound_samplers.resize(unit_ + 1, 0);
        self.bound_samplers[unit_] = handle;
      }
    }
  }

  pub(crate) unsafe fn set_scissor_test(&mut self, enabled: bool) {
    if self.scissor_test.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::SCISSOR_TEST);
      } else {
        gl::Disable(gl::SCISSOR_TEST);
      }

      self.scissor_test.set(enabled);
    }
  }

  pub(crate) unsafe fn set_scissor_box(&mut self, scissor_box: [GLint; 4]) {
    if self.scissor_box.is_invalid(&scissor_box) {
      gl::Scissor(
        scissor_box[0],
        scissor_box[1],
        scissor_box[2],
        scissor_box[3],
      );
      self.scissor_box.set(scissor_box);
    }
  }

  pub(crate) unsafe fn set_stencil_test(&mut self, enabled: bool) {
    if self.stencil_test.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::STENCIL_TEST);
      } else {
        gl::Disable(gl::STENCIL_TEST);
      }

      self.stencil_test.set(enabled);
    }
  }

  pub(crate) unsafe fn set_stencil_func(&mut self, func: GLenum, reference: GLint, mask: GLuint) {
    let stencil_func = StencilFunc {
      func,
      reference,
      mask,
    };

    if self.stencil_func.is_invalid(&stencil_func) {
      gl::StencilFunc(func, reference, mask);
      self.stencil_func.set(stencil_func);
    }
  }

  /// Set the same stencil operation for failing and passing fragments.
  pub(crate) unsafe fn set_stencil_op(&mut self, op: GLenum) {
    if self.stencil_op.is_invalid(&op) {
      gl::StencilOp(op, op, op);
      self.stencil_op.set(op);
    }
  }

  pub(crate) unsafe fn set_stencil_write_mask(&mut self, mask: GLuint) {
    if self.stencil_write_mask.is_invalid(&mask) {
      gl::StencilMask(mask);
      self.stencil_write_mask.set(mask);
    }
  }

  /// Clear the stencil buffer, whatever the current write mask.
  pub(crate) unsafe fn clear_stencil(&mut self, value: GLint) {
    if self.clear_stencil.is_invalid(&value) {
      gl::ClearStencil(value);
      self.clear_stencil.set(value);
    }

    let write_mask = self.stencil_write_mask.0;
    self.set_stencil_write_mask(0xff);

    gl::Clear(gl::STENCIL_BUFFER_BIT);

    if let Some(mask) = write_mask {
      self.set_stencil_write_mask(mask);
    }
  }

  pub(crate) unsafe fn set_color_depth_writes(&mut self, enabled: bool) {
    if self.color_depth_writes.is_invalid(&enabled) {
      let flag = if enabled { gl::TRUE } else { gl::FALSE };
      gl::ColorMask(flag, flag, flag, flag);
      gl::DepthMask(flag);

      self.color_depth_writes.set(enabled);
    }
  }

  /// Enable or disable face culling, returning the previous state if it was known.
  pub(crate) unsafe fn set_face_culling(&mut self, enabled: bool) -> Option<bool> {
    if self.face_culling.is_invalid(&enabled) {
      if enabled {
        gl::Enable(gl::CULL_FACE);
      } else {
        gl::Disable(gl::CULL_FACE);
      }
    }

    self.face_culling.replace(enabled)
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer != handle {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint) {
    if let Some(ref mut vao) = self.bound_vertex_array {
      if *vao != handle {
        gl::BindVertexArray(handle);
        *vao = handle;
      }
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }
}

/// Error raised while reading the initial GL state.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// Another backend already owns the GL state of the current thread.
  UnavailableGLState,
  /// The version string cannot be parsed.
  UnknownVersion(String),
  /// The context speaks another GL dialect than the backend.
  UnexpectedApi(String),
  /// The context is too old.
  UnsupportedVersion(GlVersion),
  /// Corrupted scissor state.
  UnknownScissorState(GLboolean),
  /// Corrupted stencil state.
  UnknownStencilState(GLboolean),
  /// Corrupted face culling state.
  UnknownFaceCullingState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownVersion(ref v) => write!(f, "unknown GL version: {:?}", v),
      StateQueryError::UnexpectedApi(ref v) => write!(f, "unexpected GL dialect: {}", v),
      StateQueryError::UnsupportedVersion(ref v) => write!(f, "unsupported GL version: {}", v),
      StateQueryError::UnknownScissorState(ref s) => write!(f, "unknown scissor state: {}", s),
      StateQueryError::UnknownStencilState(ref s) => write!(f, "unknown stencil state: {}", s),
      StateQueryError::UnknownFaceCullingState(ref s) => {
        write!(f, "unknown face culling state: {}", s)
      }
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_current_texture_unit() -> Result<GLenum, StateQueryError> {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  Ok(active_texture as GLenum - gl::TEXTURE0)
}

unsafe fn get_ctx_scissor_test() -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(gl::SCISSOR_TEST);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownScissorState(state)),
  }
}

unsafe fn get_ctx_scissor_box() -> Result<[GLint; 4], StateQueryError> {
  let mut scissor_box = [0; 4];
  gl::GetIntegerv(gl::SCISSOR_BOX, scissor_box.as_mut_ptr());
  Ok(scissor_box)
}

unsafe fn get_ctx_stencil_test() -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(gl::STENCIL_TEST);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownStencilState(state)),
  }
}

unsafe fn get_ctx_face_culling() -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(gl::CULL_FACE);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownFaceCullingState(state)),
  }
}

unsafe fn get_ctx_bound_array_buffer() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::ARRAY_BUFFER_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_bound_vertex_array() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_current_program() -> Result<GLuint, StateQueryError> {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  Ok(used as GLuint)
}
