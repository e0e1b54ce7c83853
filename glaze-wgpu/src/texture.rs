use glaze::backend::texture::{ForeignInfo, Texture as TextureBackend};
use glaze::bitmap::Bitmap;
use glaze::pixel::NativeFormat;
use glaze::sampler::{MagFilter, MinFilter, WrapMode};
use glaze::texture::TextureTarget;
use glaze::{Error, ErrorDomain};
use log::debug;

use crate::device::{record, TextureKey, TextureSlot, Wgpu};
use crate::pixel::{format_code, texture_format};

fn dimension(target: TextureTarget) -> wgpu::TextureDimension {
  match target {
    TextureTarget::Texture3D => wgpu::TextureDimension::D3,
    _ => wgpu::TextureDimension::D2,
  }
}

fn usage(target: TextureTarget) -> wgpu::TextureUsages {
  let usage =
    wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC;

  // volume textures cannot be rendered to
  match target {
    TextureTarget::Texture3D => usage,
    _ => usage | wgpu::TextureUsages::RENDER_ATTACHMENT,
  }
}

fn extent(size: [u32; 3]) -> wgpu::Extent3d {
  wgpu::Extent3d {
    width: size[0],
    height: size[1],
    depth_or_array_layers: size[2],
  }
}

fn unknown_format(format: &NativeFormat) -> Error {
  Error::unsupported(
    ErrorDomain::Texture,
    format!("unknown native format {:?}", format),
  )
}

impl Wgpu {
  // create the storage of a pending texture
  fn create_storage(
    &mut self,
    target: TextureTarget,
    texture: TextureKey,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    let texture_format = texture_format(format.internal).ok_or_else(|| unknown_format(format))?;

    let native = self.catch_errors(|device| {
      device.create_texture(&wgpu::TextureDescriptor {
        label: Some("glaze texture"),
        size: extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: dimension(target),
        format: texture_format,
        usage: usage(target),
        view_formats: &[],
      })
    })?;

    match self.textures.get_mut(texture) {
      Some(slot) => {
        slot.texture = Some(native);
        Ok(())
      }

      None => {
        native.destroy();
        Err(Error::unsupported(
          ErrorDomain::Texture,
          format!("{:?} was deleted", texture),
        ))
      }
    }
  }
}

unsafe impl TextureBackend for Wgpu {
  type TextureRepr = TextureKey;

  unsafe fn gen_texture(&mut self, target: TextureTarget) -> Self::TextureRepr {
    self.textures.insert(TextureSlot {
      target,
      texture: None,
      foreign: false,
    })
  }

  unsafe fn delete_texture(&mut self, _: TextureTarget, texture: Self::TextureRepr) {
    self.unbind_texture(texture);

    if let Some(slot) = self.textures.remove(texture) {
      match slot.texture {
        Some(native) if !slot.foreign => native.destroy(),
        _ => (),
      }
    }
  }

  unsafe fn size_supported(
    &mut self,
    target: TextureTarget,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> bool {
    if texture_format(format.internal).is_none() {
      return false;
    }

    let limits = self.device.limits();

    match target {
      TextureTarget::Texture3D => size.iter().all(|&n| n <= limits.max_texture_dimension_3d),
      TextureTarget::Texture2D => {
        size[0] <= limits.max_texture_dimension_2d && size[1] <= limits.max_texture_dimension_2d
      }
      TextureTarget::Rectangle => false,
    }
  }

  unsafe fn texture_storage(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    self.create_storage(target, texture, format, size)
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
    if format.internal != upload_format.internal {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!(
          "cannot convert {:?} texels to {:?}",
          bitmap.format(),
          texture_format(format.internal)
        ),
      ));
    }

    self.create_storage(target, texture, format, size)?;

    let native = match self.texture(texture) {
      Some(native) => native,
      None => return Err(unknown_format(format)),
    };

    let queue = &self.queue;
    self.catch_errors(|_| {
      queue.write_texture(
        wgpu::ImageCopyTexture {
          texture: native,
          mip_level: 0,
          origin: wgpu::Origin3d::ZERO,
          aspect: wgpu::TextureAspect::All,
        },
        bitmap.data(),
        wgpu::ImageDataLayout {
          offset: 0,
          bytes_per_row: Some(bitmap.rowstride() as u32),
          rows_per_image: Some(size[1]),
        },
        extent(size),
      )
    })
  }

  unsafe fn bind_foreign(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> Result<(), Error> {
    match self.textures.get(texture) {
      Some(slot) if slot.foreign && slot.target == target => Ok(()),

      Some(slot) if slot.foreign => Err(Error::invalid_foreign_object(format!(
        "imported {} cannot be used as a {}",
        slot.target, target
      ))),

      _ => Err(Error::invalid_foreign_object(format!(
        "{:?} is not an imported texture",
        texture
      ))),
    }
  }

  unsafe fn query_texture_parameters(
    &mut self,
    _: TextureTarget,
    texture: Self::TextureRepr,
  ) -> ForeignInfo {
    match self.texture(texture) {
      Some(native) => ForeignInfo {
        compressed: native.format().is_compressed(),
        internal_format: Some(format_code(native.format())),
      },

      None => ForeignInfo::default(),
    }
  }

  unsafe fn set_texture_filters(
    &mut self,
    _: TextureTarget,
    _: Self::TextureRepr,
    _: MinFilter,
    _: MagFilter,
  ) {
    // sampling state lives in sampler objects only
    debug!("texture filters are ignored; wgpu samples through sampler objects");
  }

  unsafe fn set_texture_wrap_modes(
    &mut self,
    _: TextureTarget,
    _: Self::TextureRepr,
    _: WrapMode,
    _: WrapMode,
    _: Option<WrapMode>,
  ) {
    debug!("texture wrap modes are ignored; wgpu samples through sampler objects");
  }

  unsafe fn bind_texture(&mut self, unit: u32, _: TextureTarget, texture: Self::TextureRepr) {
    record(&mut self.bound_textures, unit, texture);
  }
}
