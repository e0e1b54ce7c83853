use glaze::backend::sampler::Sampler;
use glaze::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use log::warn;

use crate::device::{record, SamplerKey, Wgpu};

fn address_mode(wrap: WrapMode, clamp_to_border: bool) -> wgpu::AddressMode {
  match wrap.resolve() {
    WrapMode::Repeat => wgpu::AddressMode::Repeat,
    WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    WrapMode::ClampToBorder if clamp_to_border => wgpu::AddressMode::ClampToBorder,
    _ => wgpu::AddressMode::ClampToEdge,
  }
}

/// Texel filter and mipmap filter of a minification filter.
fn min_filter_modes(filter: MinFilter) -> (wgpu::FilterMode, wgpu::FilterMode) {
  use wgpu::FilterMode::{Linear, Nearest};

  match filter {
    MinFilter::Nearest | MinFilter::NearestMipmapNearest => (Nearest, Nearest),
    MinFilter::Linear | MinFilter::LinearMipmapNearest => (Linear, Nearest),
    MinFilter::NearestMipmapLinear => (Nearest, Linear),
    MinFilter::LinearMipmapLinear => (Linear, Linear),
  }
}

fn mag_filter_mode(filter: MagFilter) -> wgpu::FilterMode {
  match filter {
    MagFilter::Nearest => wgpu::FilterMode::Nearest,
    MagFilter::Linear => wgpu::FilterMode::Linear,
  }
}

pub(crate) fn sampler_descriptor(
  state: &SamplerState,
  clamp_to_border: bool,
) -> wgpu::SamplerDescriptor<'static> {
  let (min_filter, mipmap_filter) = min_filter_modes(state.min_filter);
  let modes = [state.wrap_s, state.wrap_t, state.wrap_r].map(|w| address_mode(w, clamp_to_border));

  let border_color = if modes.contains(&wgpu::AddressMode::ClampToBorder) {
    Some(wgpu::SamplerBorderColor::TransparentBlack)
  } else {
    None
  };

  // filters not reading mipmaps stay on the base level
  let lod_max_clamp = if state.min_filter.uses_mipmaps() {
    32.
  } else {
    0.
  };

  wgpu::SamplerDescriptor {
    label: Some("glaze sampler"),
    address_mode_u: modes[0],
    address_mode_v: modes[1],
    address_mode_w: modes[2],
    mag_filter: mag_filter_mode(state.mag_filter),
    min_filter,
    mipmap_filter,
    lod_max_clamp,
    border_color,
    ..Default::default()
  }
}

unsafe impl Sampler for Wgpu {
  type SamplerRepr = SamplerKey;

  unsafe fn create_sampler(&mut self, state: &SamplerState) -> Self::SamplerRepr {
    let border = [state.wrap_s, state.wrap_t, state.wrap_r].contains(&WrapMode::ClampToBorder);

    if border && !self.clamp_to_border {
      warn!("clamp to border is unsupported by the device; clamping to edge");
    }

    let sampler = self
      .device
      .create_sampler(&sampler_descriptor(state, self.clamp_to_border));
    self.samplers.insert(sampler)
  }

  unsafe fn destroy_sampler(&mut self, sampler: Self::SamplerRepr) {
    self.unbind_sampler(sampler);
    self.samplers.remove(sampler);
  }

  unsafe fn bind_sampler(&mut self, unit: u32, sampler: Self::SamplerRepr) {
    record(&mut self.bound_samplers, unit, sampler);
  }
}
