use glaze::backend::clip::Clip;
use glaze::backend::features::Features as FeaturesBackend;
use glaze::features::{Capabilities, Features, Limits};
use glaze::scissor::ScissorRegion;
use glaze::texture::TextureTarget;
use glaze::{Error, ErrorDomain};
use log::debug;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
  /// Texture created or imported by a [`Wgpu`] backend.
  pub struct TextureKey;

  /// Sampler object created by a [`Wgpu`] backend.
  pub struct SamplerKey;
}

#[derive(Debug)]
pub(crate) struct TextureSlot {
  pub(crate) target: TextureTarget,
  // `None` until storage is allocated
  pub(crate) texture: Option<wgpu::Texture>,
  pub(crate) foreign: bool,
}

/// wgpu backend.
#[derive(Debug)]
pub struct Wgpu {
  pub(crate) device: Arc<wgpu::Device>,
  pub(crate) queue: Arc<wgpu::Queue>,
  pub(crate) clamp_to_border: bool,
  pub(crate) textures: SlotMap<TextureKey, TextureSlot>,
  pub(crate) samplers: SlotMap<SamplerKey, wgpu::Sampler>,
  pub(crate) bound_textures: Vec<Option<TextureKey>>,
  pub(crate) bound_samplers: Vec<Option<SamplerKey>>,
  scissor: Option<ScissorRegion>,
}

impl Wgpu {
  pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
    let clamp_to_border = device
      .features()
      .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);

    Wgpu {
      device,
      queue,
      clamp_to_border,
      textures: SlotMap::with_key(),
      samplers: SlotMap::with_key(),
      bound_textures: Vec::new(),
      bound_samplers: Vec::new(),
      scissor: None,
    }
  }

  pub fn device(&self) -> &wgpu::Device {
    &self.device
  }

  pub fn queue(&self) -> &wgpu::Queue {
    &self.queue
  }

  /// Hand a texture created elsewhere over to the backend.
  ///
  /// The returned key is what glaze expects as a foreign handle. The texture is never destroyed
  /// by the backend; take it back with [`Wgpu::release_foreign`].
  pub fn import_texture(&mut self, texture: wgpu::Texture) -> TextureKey {
    let target = match texture.dimension() {
      wgpu::TextureDimension::D3 => TextureTarget::Texture3D,
      _ => TextureTarget::Texture2D,
    };

    self.textures.insert(TextureSlot {
      target,
      texture: Some(texture),
      foreign: true,
    })
  }

  /// Take an imported texture back.
  ///
  /// Returns `None` if the key doesn't refer to an imported texture.
  pub fn release_foreign(&mut self, key: TextureKey) -> Option<wgpu::Texture> {
    match self.textures.get(key) {
      Some(slot) if slot.foreign => {
        self.unbind_texture(key);
        self.textures.remove(key).and_then(|slot| slot.texture)
      }

      _ => None,
    }
  }

  /// Native texture of a key, if it has storage.
  pub fn texture(&self, key: TextureKey) -> Option<&wgpu::Texture> {
    self.textures.get(key)?.texture.as_ref()
  }

  /// Native sampler object of a key.
  pub fn sampler(&self, key: SamplerKey) -> Option<&wgpu::Sampler> {
    self.samplers.get(key)
  }

  /// Texture bound to a texture unit.
  pub fn bound_texture(&self, unit: u32) -> Option<&wgpu::Texture> {
    let key = (*self.bound_textures.get(unit as usize)?)?;
    self.texture(key)
  }

  /// Sampler object bound to a texture unit.
  pub fn bound_sampler(&self, unit: u32) -> Option<&wgpu::Sampler> {
    let key = (*self.bound_samplers.get(unit as usize)?)?;
    self.sampler(key)
  }

  /// Scissor rectangle of the last clip flush (bottom-left origin), or `None` when unclipped.
  ///
  /// wgpu scissors have a top-left origin; convert with the height of the render target.
  pub fn scissor(&self) -> Option<ScissorRegion> {
    self.scissor
  }

  pub(crate) fn unbind_texture(&mut self, key: TextureKey) {
    for bound in &mut self.bound_textures {
      if *bound == Some(key) {
        *bound = None;
      }
    }
  }

  pub(crate) fn unbind_sampler(&mut self, key: SamplerKey) {
    for bound in &mut self.bound_samplers {
      if *bound == Some(key) {
        *bound = None;
      }
    }
  }

  /// Run device calls, catching the errors they raise instead of letting the device's uncaught
  /// error handler see them.
  pub(crate) fn catch_errors<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, Error> {
    self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    self.device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f(&self.device);

    let validation = pollster::block_on(self.device.pop_error_scope());
    let out_of_memory = pollster::block_on(self.device.pop_error_scope());

    if let Some(e) = out_of_memory {
      return Err(Error::resource_exhausted(ErrorDomain::Driver, e.to_string()));
    }

    if let Some(e) = validation {
      return Err(Error::unsupported(ErrorDomain::Driver, e.to_string()));
    }

    Ok(value)
  }
}

pub(crate) fn record<K>(bindings: &mut Vec<Option<K>>, unit: u32, key: K) {
  let unit = unit as usize;

  if bindings.len() <= unit {
    bindings.resize_with(unit + 1, || None);
  }

  bindings[unit] = Some(key);
}

unsafe impl FeaturesBackend for Wgpu {
  fn backend_name(&self) -> &'static str {
    "wgpu"
  }

  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error> {
    let device_limits = self.device.limits();

    let features = Features::TEXTURE_NPOT
      | Features::TEXTURE_3D
      | Features::SAMPLER_OBJECTS
      | Features::QUERY_TEXTURE_PARAMETERS
      | Features::FOREIGN_TEXTURES;

    let limits = Limits {
      max_texture_size: device_limits.max_texture_dimension_2d,
      max_3d_texture_size: device_limits.max_texture_dimension_3d,
      max_rectangle_texture_size: 0,
    };

    debug!(
      "wgpu device: clamp to border {}",
      if self.clamp_to_border { "supported" } else { "unsupported" }
    );

    Ok(Capabilities::new(features, limits))
  }
}

unsafe impl Clip for Wgpu {
  unsafe fn set_scissor(&mut self, region: Option<ScissorRegion>) {
    self.scissor = region;
  }
}
