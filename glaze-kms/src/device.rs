use glaze::backend::clip::Clip;
use glaze::backend::features::Features as FeaturesBackend;
use glaze::backend::sampler::Sampler;
use glaze::features::{Capabilities, Features, Limits};
use glaze::sampler::SamplerState;
use glaze::scissor::ScissorRegion;
use glaze::texture::TextureTarget;
use glaze::{Error, ErrorDomain};
use log::debug;
use slotmap::{new_key_type, SlotMap};

use crate::format::{bytes_per_pixel, Fourcc};

/// Pitches of dumb buffers are aligned to this many bytes.
pub const PITCH_ALIGNMENT: u32 = 64;

new_key_type! {
  /// Dumb buffer created or imported by a [`Kms`] backend.
  pub struct BufferKey;
}

/// Construction parameters of a [`Kms`] backend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KmsConfig {
  /// Bytes of scanout memory the backend may allocate, imported buffers excluded.
  pub memory_budget: usize,
  /// Largest width / height of a buffer.
  pub max_buffer_size: u32,
}

impl Default for KmsConfig {
  fn default() -> Self {
    KmsConfig {
      memory_budget: 64 << 20,
      max_buffer_size: 4096,
    }
  }
}

/// Filter the display engine scales a plane with.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ScalingFilter {
  #[default]
  Default,
  NearestNeighbor,
}

/// Host-mapped dumb buffer.
#[derive(Debug)]
pub struct DumbBuffer {
  width: u32,
  height: u32,
  pitch: u32,
  fourcc: Fourcc,
  data: Vec<u8>,
}

impl DumbBuffer {
  pub(crate) fn allocate(
    width: u32,
    height: u32,
    fourcc: Fourcc,
    pitch: u32,
  ) -> Result<Self, Error> {
    let len = pitch as usize * height as usize;
    let mut data = Vec::new();

    data.try_reserve_exact(len).map_err(|e| {
      Error::resource_exhausted(
        ErrorDomain::Driver,
        format!("cannot map a {}x{} {} buffer: {}", width, height, fourcc, e),
      )
    })?;
    data.resize(len, 0);

    Ok(DumbBuffer {
      width,
      height,
      pitch,
      fourcc,
      data,
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  /// Bytes between the starts of two consecutive rows.
  pub fn pitch(&self) -> u32 {
    self.pitch
  }

  pub fn fourcc(&self) -> Fourcc {
    self.fourcc
  }

  /// Mapped content, `pitch * height` bytes.
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub(crate) fn data_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

#[derive(Debug)]
pub(crate) struct BufferSlot {
  pub(crate) target: TextureTarget,
  // `None` until storage is allocated
  pub(crate) buffer: Option<DumbBuffer>,
  pub(crate) foreign: bool,
  pub(crate) scaling_filter: ScalingFilter,
}

/// Pitch of a buffer row, aligned to [`PITCH_ALIGNMENT`].
pub fn aligned_pitch(width: u32, bytes_per_pixel: u32) -> Option<u32> {
  let row = width.checked_mul(bytes_per_pixel)?;
  let aligned = row.checked_add(PITCH_ALIGNMENT - 1)?;
  Some(aligned / PITCH_ALIGNMENT * PITCH_ALIGNMENT)
}

/// Kernel mode-setting backend.
///
/// Textures are dumb buffers: linear, host-mapped memory the display engine scans out directly.
/// There is no sampling hardware; binding a texture to a unit attaches it to the plane of the
/// same index, and filters only choose the scaling filter of that plane.
#[derive(Debug)]
pub struct Kms {
  config: KmsConfig,
  memory_used: usize,
  pub(crate) buffers: SlotMap<BufferKey, BufferSlot>,
  pub(crate) planes: Vec<Option<BufferKey>>,
  crop: Option<ScissorRegion>,
}

impl Kms {
  pub fn new(config: KmsConfig) -> Self {
    Kms {
      config,
      memory_used: 0,
      buffers: SlotMap::with_key(),
      planes: Vec::new(),
      crop: None,
    }
  }

  pub fn config(&self) -> &KmsConfig {
    &self.config
  }

  /// Bytes of the budget currently allocated.
  pub fn memory_used(&self) -> usize {
    self.memory_used
  }

  /// Hand a buffer mapped elsewhere over to the backend.
  ///
  /// `data` must hold at least `pitch * height` bytes. Imported buffers don't count against the
  /// memory budget; take them back with [`Kms::release_foreign`].
  pub fn import_buffer(
    &mut self,
    width: u32,
    height: u32,
    pitch: u32,
    fourcc: Fourcc,
    data: Vec<u8>,
  ) -> Result<BufferKey, Error> {
    let min_pitch = bytes_per_pixel(fourcc).and_then(|bpp| width.checked_mul(bpp));

    match min_pitch {
      Some(min_pitch) if pitch >= min_pitch => (),

      Some(_) => {
        return Err(Error::invalid_foreign_object(format!(
          "pitch {} is too small for a {} buffer {} pixels wide",
          pitch, fourcc, width
        )))
      }

      // unknown formats are rejected when the buffer is adopted
      None if pitch > 0 => (),

      None => {
        return Err(Error::invalid_foreign_object("imported buffers need a pitch"));
      }
    }

    if (data.len() as u64) < pitch as u64 * height as u64 {
      return Err(Error::invalid_foreign_object(format!(
        "{} bytes cannot hold {} rows of {} bytes",
        data.len(),
        height,
        pitch
      )));
    }

    let buffer = DumbBuffer {
      width,
      height,
      pitch,
      fourcc,
      data,
    };

    Ok(self.buffers.insert(BufferSlot {
      target: TextureTarget::Texture2D,
      buffer: Some(buffer),
      foreign: true,
      scaling_filter: ScalingFilter::Default,
    }))
  }

  /// Take an imported buffer back.
  ///
  /// Returns `None` if the key doesn't refer to an imported buffer.
  pub fn release_foreign(&mut self, key: BufferKey) -> Option<DumbBuffer> {
    match self.buffers.get(key) {
      Some(slot) if slot.foreign => {
        self.detach(key);
        self.buffers.remove(key).and_then(|slot| slot.buffer)
      }

      _ => None,
    }
  }

  /// Buffer of a key, if it has storage.
  pub fn buffer(&self, key: BufferKey) -> Option<&DumbBuffer> {
    self.buffers.get(key)?.buffer.as_ref()
  }

  /// Scaling filter of a buffer.
  pub fn scaling_filter(&self, key: BufferKey) -> Option<ScalingFilter> {
    self.buffers.get(key).map(|slot| slot.scaling_filter)
  }

  /// Buffer attached to a plane.
  pub fn plane(&self, index: u32) -> Option<&DumbBuffer> {
    let key = (*self.planes.get(index as usize)?)?;
    self.buffer(key)
  }

  /// Crop rectangle of the last clip flush (bottom-left origin), or `None` when unclipped.
  pub fn crop(&self) -> Option<ScissorRegion> {
    self.crop
  }

  /// Charge `bytes` against the memory budget.
  pub(crate) fn reserve(&mut self, bytes: usize) -> Result<(), Error> {
    let used = self.memory_used.checked_add(bytes);

    match used {
      Some(used) if used <= self.config.memory_budget => {
        self.memory_used = used;
        Ok(())
      }

      _ => Err(Error::resource_exhausted(
        ErrorDomain::Driver,
        format!(
          "{} bytes requested with {} of {} bytes of scanout memory in use",
          bytes, self.memory_used, self.config.memory_budget
        ),
      )),
    }
  }

  pub(crate) fn release(&mut self, bytes: usize) {
    self.memory_used = self.memory_used.saturating_sub(bytes);
  }

  pub(crate) fn detach(&mut self, key: BufferKey) {
    for plane in &mut self.planes {
      if *plane == Some(key) {
        *plane = None;
      }
    }
  }
}

unsafe impl FeaturesBackend for Kms {
  fn backend_name(&self) -> &'static str {
    "kms"
  }

  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error> {
    let features =
      Features::TEXTURE_NPOT | Features::QUERY_TEXTURE_PARAMETERS | Features::FOREIGN_TEXTURES;

    let limits = Limits {
      max_texture_size: self.config.max_buffer_size,
      max_3d_texture_size: 0,
      max_rectangle_texture_size: 0,
    };

    debug!(
      "dumb buffers: {} bytes of scanout memory",
      self.config.memory_budget
    );

    Ok(Capabilities::new(features, limits))
  }
}

// no sampler objects; sampling state lives in the planes
unsafe impl Sampler for Kms {
  type SamplerRepr = ();

  unsafe fn create_sampler(&mut self, _: &SamplerState) -> Self::SamplerRepr {}

  unsafe fn destroy_sampler(&mut self, _: Self::SamplerRepr) {}

  unsafe fn bind_sampler(&mut self, _: u32, _: Self::SamplerRepr) {}
}

unsafe impl Clip for Kms {
  unsafe fn set_scissor(&mut self, region: Option<ScissorRegion>) {
    self.crop = region;
  }
}
