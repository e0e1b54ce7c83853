use gl::types::*;
use glaze::backend::texture::{ForeignInfo, Texture as TextureBackend};
use glaze::bitmap::Bitmap;
use glaze::pixel::NativeFormat;
use glaze::sampler::{MagFilter, MinFilter, WrapMode};
use glaze::texture::{FirstPixel, TextureTarget};
use glaze::{Error, ErrorDomain};
use log::warn;
use std::borrow::Cow;
use std::os::raw::c_void;
use std::ptr;

use crate::driver::{catch_any_error, catch_out_of_memory, Flavor, Gl};

// automatic mipmap generation of pre-3.1 contexts, missing from core profile bindings
const GL_GENERATE_MIPMAP: GLenum = 0x8191;

pub(crate) fn opengl_target(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture2D => gl::TEXTURE_2D,
    TextureTarget::Texture3D => gl::TEXTURE_3D,
    TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
  }
}

fn opengl_proxy_target(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture2D => gl::PROXY_TEXTURE_2D,
    TextureTarget::Texture3D => gl::PROXY_TEXTURE_3D,
    TextureTarget::Rectangle => gl::PROXY_TEXTURE_RECTANGLE,
  }
}

pub(crate) fn opengl_wrap(wrap: WrapMode, embedded: bool) -> GLenum {
  match wrap.resolve() {
    WrapMode::Repeat => gl::REPEAT,
    WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
    // OpenGL ES 2 has no border color
    WrapMode::ClampToBorder if !embedded => gl::CLAMP_TO_BORDER,
    _ => gl::CLAMP_TO_EDGE,
  }
}

pub(crate) fn opengl_min_filter(filter: MinFilter) -> GLenum {
  match filter {
    MinFilter::Nearest => gl::NEAREST,
    MinFilter::Linear => gl::LINEAR,
    MinFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
    MinFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
    MinFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
    MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
  }
}

pub(crate) fn opengl_mag_filter(filter: MagFilter) -> GLenum {
  match filter {
    MagFilter::Nearest => gl::NEAREST,
    MagFilter::Linear => gl::LINEAR,
  }
}

// set the unpack alignment for uploading aligned texels
fn set_unpack_alignment(skip_bytes: usize) {
  let unpack_alignment = match skip_bytes {
    0 => 8,
    2 => 2,
    4 => 4,
    _ => 1,
  };

  unsafe { gl::PixelStorei(gl::UNPACK_ALIGNMENT, unpack_alignment) };
}

/// Rows of a bitmap laid out for a single upload.
///
/// Returns the texels and the row length (in pixels) to unpack them with; `0` means tightly
/// packed.
fn upload_rows(bitmap: &Bitmap, rows: usize, row_length: bool) -> (Cow<[u8]>, GLint) {
  let bpp = bitmap.format().bytes_per_pixel();
  let row_len = bitmap.width() as usize * bpp;
  let stride = bitmap.rowstride();
  let data = bitmap.data();

  if stride == row_len {
    return (Cow::Borrowed(&data[..row_len * rows]), 0);
  }

  if row_length && stride % bpp == 0 {
    let len = stride * rows.saturating_sub(1) + row_len;
    return (Cow::Borrowed(&data[..len]), (stride / bpp) as GLint);
  }

  // repack without padding
  let mut packed = Vec::with_capacity(row_len * rows);
  for row in data.chunks(stride).take(rows) {
    packed.extend_from_slice(&row[..row_len]);
  }

  (Cow::Owned(packed), 0)
}

unsafe fn tex_image(
  target: GLenum,
  format: &NativeFormat,
  transfer: &NativeFormat,
  size: [u32; 3],
  texels: *const c_void,
) {
  if target == gl::TEXTURE_3D || target == gl::PROXY_TEXTURE_3D {
    gl::TexImage3D(
      target,
      0,
      format.internal as GLint,
      size[0] as GLsizei,
      size[1] as GLsizei,
      size[2] as GLsizei,
      0,
      transfer.transfer,
      transfer.component_type,
      texels,
    );
  } else {
    gl::TexImage2D(
      target,
      0,
      format.internal as GLint,
      size[0] as GLsizei,
      size[1] as GLsizei,
      0,
      transfer.transfer,
      transfer.component_type,
      texels,
    );
  }
}

impl<F> Gl<F>
where
  F: Flavor,
{
  // bind a texture on the current unit so that it can be worked on
  unsafe fn bind_for_update(&mut self, target: TextureTarget, texture: GLuint) {
    self.state.bind_texture(opengl_target(target), texture);
  }

  // alpha-only textures are stored in the red channel on desktop
  unsafe fn swizzle_alpha(&mut self, target: GLenum, format: &NativeFormat) {
    if !F::EMBEDDED && format.transfer == gl::RED && format.internal == gl::R8 {
      let swizzle = [gl::ZERO, gl::ZERO, gl::ZERO, gl::RED].map(|c| c as GLint);
      gl::TexParameteriv(target, gl::TEXTURE_SWIZZLE_RGBA, swizzle.as_ptr());
    }
  }

  fn allocation_error(target: TextureTarget, size: [u32; 3]) -> Error {
    Error::resource_exhausted(
      ErrorDomain::Driver,
      format!("out of memory allocating a {} of size {:?}", target, size),
    )
  }
}

unsafe impl<F> TextureBackend for Gl<F>
where
  F: Flavor,
{
  type TextureRepr = GLuint;

  unsafe fn gen_texture(&mut self, target: TextureTarget) -> Self::TextureRepr {
    let handle = self.state.create_texture();
    let gl_target = opengl_target(target);

    self.state.bind_texture(gl_target, handle);

    // the GL default minification filter samples mipmaps
    gl::TexParameteri(gl_target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
    gl::TexParameteri(gl_target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);

    handle
  }

  unsafe fn delete_texture(&mut self, _: TextureTarget, texture: Self::TextureRepr) {
    self.state.delete_texture(texture);
  }

  unsafe fn size_supported(
    &mut self,
    target: TextureTarget,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> bool {
    if F::EMBEDDED {
      // no proxy textures; the reported limits are all there is
      let max = match target {
        TextureTarget::Texture3D => self.limits.max_3d_texture_size,
        TextureTarget::Rectangle => self.limits.max_rectangle_texture_size,
        TextureTarget::Texture2D => self.limits.max_texture_size,
      };

      return size.iter().all(|&n| n <= max);
    }

    let proxy = opengl_proxy_target(target);
    tex_image(proxy, format, format, size, ptr::null());

    let mut width = 0;
    gl::GetTexLevelParameteriv(proxy, 0, gl::TEXTURE_WIDTH, &mut width);
    catch_any_error();

    width != 0
  }

  unsafe fn texture_storage(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    let gl_target = opengl_target(target);

    self.bind_for_update(target, texture);
    catch_out_of_memory();

    tex_image(gl_target, format, format, size, ptr::null());

    if catch_out_of_memory() {
      return Err(Self::allocation_error(target, size));
    }

    self.swizzle_alpha(gl_target, format);
    Ok(())
  }

  unsafe fn texture_upload(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    upload_format: &NativeFormat,
    bitmap: &Bitmap,
    size: [u32; 3],
  ) -> Result<(), Error> {
    if F::EMBEDDED && format.internal != upload_format.transfer {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!(
          "cannot convert {:?} texels to internal format {:#x}",
          bitmap.format(),
          format.internal
        ),
      ));
    }

    let gl_target = opengl_target(target);
    let rows = size[1] as usize * size[2] as usize;
    let (texels, row_length) = upload_rows(bitmap, rows, !F::EMBEDDED);

    self.bind_for_update(target, texture);
    catch_out_of_memory();

    let row_bytes = match row_length {
      0 => bitmap.width() as usize * bitmap.format().bytes_per_pixel(),
      _ => bitmap.rowstride(),
    };
    set_unpack_alignment(row_bytes % 8);

    if !F::EMBEDDED {
      gl::PixelStorei(gl::UNPACK_ROW_LENGTH, row_length);
    }

    tex_image(
      gl_target,
      format,
      upload_format,
      size,
      texels.as_ptr() as *const c_void,
    );

    if !F::EMBEDDED && row_length != 0 {
      gl::PixelStorei(gl::UNPACK_ROW_LENGTH, 0);
    }

    if catch_out_of_memory() {
      return Err(Self::allocation_error(target, size));
    }

    self.swizzle_alpha(gl_target, format);
    Ok(())
  }

  unsafe fn bind_foreign(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> Result<(), Error> {
    if gl::IsTexture(texture) == gl::FALSE {
      return Err(Error::invalid_foreign_object(format!(
        "{} is not a GL texture",
        texture
      )));
    }

    catch_any_error();

    // the binding is unknown to the cache, so force it
    self.state.forget_current_texture();
    self.bind_for_update(target, texture);

    if catch_any_error() {
      return Err(Error::invalid_foreign_object(format!(
        "GL texture {} cannot be bound as a {}",
        texture, target
      )));
    }

    Ok(())
  }

  unsafe fn query_texture_parameters(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> ForeignInfo {
    let gl_target = opengl_target(target);
    self.bind_for_update(target, texture);

    let mut compressed = 0;
    let mut internal = 0;
    gl::GetTexLevelParameteriv(gl_target, 0, gl::TEXTURE_COMPRESSED, &mut compressed);
    gl::GetTexLevelParameteriv(gl_target, 0, gl::TEXTURE_INTERNAL_FORMAT, &mut internal);

    if catch_any_error() {
      warn!("cannot query the parameters of GL texture {}", texture);
      return ForeignInfo::default();
    }

    ForeignInfo {
      compressed: compressed != 0,
      internal_format: Some(internal as u32),
    }
  }

  unsafe fn set_texture_filters(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) {
    let gl_target = opengl_target(target);
    self.bind_for_update(target, texture);

    gl::TexParameteri(
      gl_target,
      gl::TEXTURE_MIN_FILTER,
      opengl_min_filter(min_filter) as GLint,
    );
    gl::TexParameteri(
      gl_target,
      gl::TEXTURE_MAG_FILTER,
      opengl_mag_filter(mag_filter) as GLint,
    );
  }

  unsafe fn set_texture_wrap_modes(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    wrap_r: Option<WrapMode>,
  ) {
    let gl_target = opengl_target(target);
    self.bind_for_update(target, texture);

    gl::TexParameteri(
      gl_target,
      gl::TEXTURE_WRAP_S,
      opengl_wrap(wrap_s, F::EMBEDDED) as GLint,
    );
    gl::TexParameteri(
      gl_target,
      gl::TEXTURE_WRAP_T,
      opengl_wrap(wrap_t, F::EMBEDDED) as GLint,
    );

    if let Some(wrap_r) = wrap_r {
      gl::TexParameteri(
        gl_target,
        gl::TEXTURE_WRAP_R,
        opengl_wrap(wrap_r, F::EMBEDDED) as GLint,
      );
    }
  }

  unsafe fn generate_mipmap(&mut self, target: TextureTarget, texture: Self::TextureRepr) {
    self.bind_for_update(target, texture);
    gl::GenerateMipmap(opengl_target(target));
  }

  unsafe fn legacy_generate_mipmap(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    first_pixel: &FirstPixel,
  ) {
    let gl_target = opengl_target(target);
    self.bind_for_update(target, texture);

    gl::TexParameteri(gl_target, GL_GENERATE_MIPMAP, gl::TRUE as GLint);

    // rewriting any texel regenerates the whole chain
    set_unpack_alignment(1);
    gl::TexSubImage2D(
      gl_target,
      0,
      0,
      0,
      1,
      1,
      first_pixel.format.transfer,
      first_pixel.format.component_type,
      first_pixel.bytes().as_ptr() as *const c_void,
    );

    gl::TexParameteri(gl_target, GL_GENERATE_MIPMAP, gl::FALSE as GLint);
  }

  unsafe fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Self::TextureRepr) {
    self.state.set_texture_unit(unit);
    self.state.bind_texture(opengl_target(target), texture);
  }
}
