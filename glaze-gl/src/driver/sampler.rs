use gl::types::*;
use glaze::backend::sampler::Sampler;
use glaze::sampler::SamplerState;

use crate::driver::texture::{opengl_mag_filter, opengl_min_filter, opengl_wrap};
use crate::driver::{Flavor, Gl};

unsafe impl<F> Sampler for Gl<F>
where
  F: Flavor,
{
  type SamplerRepr = GLuint;

  unsafe fn create_sampler(&mut self, state: &SamplerState) -> Self::SamplerRepr {
    let mut handle = 0;
    gl::GenSamplers(1, &mut handle);

    let params = [
      (gl::TEXTURE_MIN_FILTER, opengl_min_filter(state.min_filter)),
      (gl::TEXTURE_MAG_FILTER, opengl_mag_filter(state.mag_filter)),
      (gl::TEXTURE_WRAP_S, opengl_wrap(state.wrap_s, F::EMBEDDED)),
      (gl::TEXTURE_WRAP_T, opengl_wrap(state.wrap_t, F::EMBEDDED)),
      (gl::TEXTURE_WRAP_R, opengl_wrap(state.wrap_r, F::EMBEDDED)),
    ];

    for (pname, value) in params {
      gl::SamplerParameteri(handle, pname, value as GLint);
    }

    handle
  }

  unsafe fn destroy_sampler(&mut self, sampler: Self::SamplerRepr) {
    self.state.delete_sampler(sampler);
  }

  unsafe fn bind_sampler(&mut self, unit: u32, sampler: Self::SamplerRepr) {
    self.state.bind_sampler(unit, sampler);
  }
}
