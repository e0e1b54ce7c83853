//! The program drawing clip shapes into the stencil buffer.

use cgmath::Matrix4;
use gl::types::*;
use std::ffi::CString;
use std::mem;
use std::os::raw::c_void;
use std::ptr::{null, null_mut};

use crate::driver::features::{has_vertex_arrays, GlVersion};
use crate::driver::state::GLState;

const VS_BODY: &str = "
uniform mat4 transform;

void main() {
  gl_Position = transform * vec4(position, 0., 1.);
}";

const FS_BODY: &str = "
void main() {
  FRAG_COLOR = vec4(1.);
}";

fn sources(version: GlVersion) -> (String, String) {
  let glsl = if version.embedded {
    "100"
  } else if version.at_least(3, 3) {
    "330 core"
  } else if version.at_least(3, 2) {
    "150"
  } else if version.at_least(3, 0) {
    "130"
  } else {
    "120"
  };

  let (vs_decl, fs_decl) = if version.embedded {
    (
      "attribute vec2 position;\n",
      "precision mediump float;\n#define FRAG_COLOR gl_FragColor\n",
    )
  } else if version.at_least(3, 0) {
    ("in vec2 position;\n", "out vec4 frag;\n#define FRAG_COLOR frag\n")
  } else {
    ("attribute vec2 position;\n", "#define FRAG_COLOR gl_FragColor\n")
  };

  (
    format!("#version {}\n{}{}", glsl, vs_decl, VS_BODY),
    format!("#version {}\n{}{}", glsl, fs_decl, FS_BODY),
  )
}

unsafe fn compile_stage(ty: GLenum, src: &str) -> Result<GLuint, String> {
  let handle = gl::CreateShader(ty);

  if handle == 0 {
    return Err("unable to create shader stage".to_owned());
  }

  let c_src = CString::new(src).map_err(|e| e.to_string())?;
  gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
  gl::CompileShader(handle);

  let mut compiled: GLint = gl::FALSE.into();
  gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

  if compiled == gl::TRUE.into() {
    Ok(handle)
  } else {
    let mut log_len: GLint = 0;
    gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
    gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

    gl::DeleteShader(handle);

    Err(String::from_utf8_lossy(&log).into_owned())
  }
}

unsafe fn link(handle: GLuint) -> Result<(), String> {
  gl::LinkProgram(handle);

  let mut linked: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

  if linked == gl::TRUE.into() {
    Ok(())
  } else {
    let mut log_len: GLint = 0;
    gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
    gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

    Err(String::from_utf8_lossy(&log).into_owned())
  }
}

/// Flat program with a single 2D position attribute, streamed from its own buffer.
#[derive(Debug)]
pub(crate) struct StencilProgram {
  program: GLuint,
  transform: GLint,
  buffer: GLuint,
  vertex_array: Option<GLuint>,
}

impl StencilProgram {
  pub(crate) unsafe fn new(version: GlVersion, state: &mut GLState) -> Result<Self, String> {
    let (vs_src, fs_src) = sources(version);

    let vs = compile_stage(gl::VERTEX_SHADER, &vs_src)?;
    let fs = match compile_stage(gl::FRAGMENT_SHADER, &fs_src) {
      Ok(fs) => fs,
      Err(e) => {
        gl::DeleteShader(vs);
        return Err(e);
      }
    };

    let program = gl::CreateProgram();
    gl::AttachShader(program, vs);
    gl::AttachShader(program, fs);
    gl::BindAttribLocation(program, 0, b"position\0".as_ptr() as *const GLchar);

    let linked = link(program);

    // stages are not needed once linked
    gl::DeleteShader(vs);
    gl::DeleteShader(fs);

    if let Err(e) = linked {
      gl::DeleteProgram(program);
      return Err(e);
    }

    let transform = gl::GetUniformLocation(program, b"transform\0".as_ptr() as *const GLchar);

    let mut buffer = 0;
    gl::GenBuffers(1, &mut buffer);

    let vertex_array = if has_vertex_arrays(version) {
      let mut vao = 0;
      gl::GenVertexArrays(1, &mut vao);

      state.bind_vertex_array(vao);
      state.bind_array_buffer(buffer);
      gl::EnableVertexAttribArray(0);
      gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, 0, null());

      Some(vao)
    } else {
      None
    };

    Ok(StencilProgram {
      program,
      transform,
      buffer,
      vertex_array,
    })
  }

  pub(crate) unsafe fn draw(
    &self,
    state: &mut GLState,
    vertices: &[[f32; 2]],
    mode: GLenum,
    transform: &Matrix4<f32>,
  ) {
    state.use_program(self.program);

    let matrix: &[f32; 16] = transform.as_ref();
    gl::UniformMatrix4fv(self.transform, 1, gl::FALSE, matrix.as_ptr());

    if let Some(vao) = self.vertex_array {
      state.bind_vertex_array(vao);
    }

    state.bind_array_buffer(self.buffer);
    gl::BufferData(
      gl::ARRAY_BUFFER,
      mem::size_of_val(vertices) as GLsizeiptr,
      vertices.as_ptr() as *const c_void,
      gl::STREAM_DRAW,
    );

    // without vertex arrays, the attribute layout is global
    if self.vertex_array.is_none() {
      gl::EnableVertexAttribArray(0);
      gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, 0, null());
    }

    gl::DrawArrays(mode, 0, vertices.len() as GLsizei);

    if self.vertex_array.is_none() {
      gl::DisableVertexAttribArray(0);
    }
  }
}

impl Drop for StencilProgram {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteProgram(self.program);
      gl::DeleteBuffers(1, &self.buffer);

      if let Some(ref vao) = self.vertex_array {
        gl::DeleteVertexArrays(1, vao);
      }
    }
  }
}
