use glaze::backend::texture::{ForeignInfo, Texture as TextureBackend};
use glaze::bitmap::Bitmap;
use glaze::pixel::NativeFormat;
use glaze::sampler::{MagFilter, MinFilter, WrapMode};
use glaze::texture::TextureTarget;
use glaze::{Error, ErrorDomain};
use log::debug;

use crate::device::{aligned_pitch, BufferKey, BufferSlot, DumbBuffer, Kms, ScalingFilter};
use crate::format::Fourcc;

fn scaling_filter(min_filter: MinFilter, mag_filter: MagFilter) -> ScalingFilter {
  // planes scale with a single filter, used in both directions
  match (min_filter, mag_filter) {
    (MinFilter::Nearest | MinFilter::NearestMipmapNearest, MagFilter::Nearest) => {
      ScalingFilter::NearestNeighbor
    }
    _ => ScalingFilter::Default,
  }
}

/// Copy `rows` rows of `row_len` bytes from a bitmap into a buffer.
fn copy_rows(buffer: &mut DumbBuffer, bitmap: &Bitmap, rows: usize, row_len: usize) -> Result<(), Error> {
  let pitch = buffer.pitch() as usize;
  let stride = bitmap.rowstride();
  let src = bitmap.data();
  let dst = buffer.data_mut();

  for row in 0..rows {
    let from = src.get(row * stride..row * stride + row_len);
    let to = dst.get_mut(row * pitch..row * pitch + row_len);

    match (from, to) {
      (Some(from), Some(to)) => to.copy_from_slice(from),

      _ => {
        return Err(Error::unsupported(
          ErrorDomain::Texture,
          format!("row {} of the bitmap doesn't fit the buffer", row),
        ))
      }
    }
  }

  Ok(())
}

impl Kms {
  // map the buffer of a pending texture, charging it against the budget
  fn create_storage(
    &mut self,
    texture: BufferKey,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    let fourcc = Fourcc(format.internal);
    let [width, height, _] = size;

    let pitch = aligned_pitch(width, format.component_type).ok_or_else(|| {
      Error::unsupported(
        ErrorDomain::Texture,
        format!("a {} buffer {} pixels wide has no valid pitch", fourcc, width),
      )
    })?;
    let bytes = pitch as usize * height as usize;

    if !self.buffers.contains_key(texture) {
      return Err(Error::unsupported(
        ErrorDomain::Texture,
        format!("{:?} was deleted", texture),
      ));
    }

    self.reserve(bytes)?;

    let buffer = match DumbBuffer::allocate(width, height, fourcc, pitch) {
      Ok(buffer) => buffer,
      Err(e) => {
        self.release(bytes);
        return Err(e);
      }
    };

    debug!(
      "mapped a {}x{} {} dumb buffer ({} of {} bytes used)",
      width,
      height,
      fourcc,
      self.memory_used(),
      self.config().memory_budget
    );

    if let Some(slot) = self.buffers.get_mut(texture) {
      slot.buffer = Some(buffer);
    }

    Ok(())
  }
}

unsafe impl TextureBackend for Kms {
  type TextureRepr = BufferKey;

  unsafe fn gen_texture(&mut self, target: TextureTarget) -> Self::TextureRepr {
    self.buffers.insert(BufferSlot {
      target,
      buffer: None,
      foreign: false,
      scaling_filter: ScalingFilter::Default,
    })
  }

  unsafe fn delete_texture(&mut self, _: TextureTarget, texture: Self::TextureRepr) {
    self.detach(texture);

    if let Some(slot) = self.buffers.remove(texture) {
      match slot.buffer {
        Some(buffer) if !slot.foreign => self.release(buffer.data().len()),
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
    let max = self.config().max_buffer_size;

    target == TextureTarget::Texture2D
      && size[0] <= max
      && size[1] <= max
      && aligned_pitch(size[0], format.component_type).is_some()
  }

  unsafe fn texture_storage(
    &mut self,
    _: TextureTarget,
    texture: Self::TextureRepr,
    format: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    self.create_storage(texture, format, size)
  }

  unsafe fn texture_upload(
    &mut self,
    _: TextureTarget,
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
          "cannot convert {} pixels to {}",
          Fourcc(upload_format.internal),
          Fourcc(format.internal)
        ),
      ));
    }

    self.create_storage(texture, format, size)?;

    let row_len = size[0] as usize * format.component_type as usize;

    // on failure, the core deletes the handle, which gives the memory back
    match self.buffers.get_mut(texture).and_then(|slot| slot.buffer.as_mut()) {
      Some(buffer) => copy_rows(buffer, bitmap, size[1] as usize, row_len),
      None => Ok(()),
    }
  }

  unsafe fn bind_foreign(
    &mut self,
    target: TextureTarget,
    texture: Self::TextureRepr,
  ) -> Result<(), Error> {
    match self.buffers.get(texture) {
      Some(slot) if slot.foreign && slot.target == target => Ok(()),

      Some(slot) if slot.foreign => Err(Error::invalid_foreign_object(format!(
        "imported buffers cannot be used as a {}",
        target
      ))),

      _ => Err(Error::invalid_foreign_object(format!(
        "{:?} is not an imported buffer",
        texture
      ))),
    }
  }

  unsafe fn query_texture_parameters(
    &mut self,
    _: TextureTarget,
    texture: Self::TextureRepr,
  ) -> ForeignInfo {
    ForeignInfo {
      compressed: false,
      internal_format: self.buffer(texture).map(|buffer| buffer.fourcc().0),
    }
  }

  unsafe fn set_texture_filters(
    &mut self,
    _: TextureTarget,
    texture: Self::TextureRepr,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) {
    if let Some(slot) = self.buffers.get_mut(texture) {
      slot.scaling_filter = scaling_filter(min_filter, mag_filter);
    }
  }

  unsafe fn set_texture_wrap_modes(
    &mut self,
    _: TextureTarget,
    _: Self::TextureRepr,
    _: WrapMode,
    _: WrapMode,
    _: Option<WrapMode>,
  ) {
    debug!("wrap modes are ignored; planes never sample outside of their buffer");
  }

  unsafe fn bind_texture(&mut self, unit: u32, _: TextureTarget, texture: Self::TextureRepr) {
    let unit = unit as usize;

    if self.planes.len() <= unit {
      self.planes.resize(unit + 1, None);
    }

    self.planes[unit] = Some(texture);
  }
}
