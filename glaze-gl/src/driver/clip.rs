use cgmath::Matrix4;
use gl::types::*;
use glaze::backend::clip::Clip;
use glaze::scissor::ScissorRegion;
use glaze::silhouette::{Silhouette, Topology};
use glaze::stencil::{Comparison, StencilOp};
use log::error;

use crate::driver::program::StencilProgram;
use crate::driver::stencil::{comparison_to_glenum, stencil_op_to_glenum};
use crate::driver::{Flavor, Gl};

fn opengl_mode(topology: Topology) -> GLenum {
  match topology {
    Topology::Triangles => gl::TRIANGLES,
    Topology::TriangleStrip => gl::TRIANGLE_STRIP,
    Topology::TriangleFan => gl::TRIANGLE_FAN,
  }
}

impl<F> Gl<F>
where
  F: Flavor,
{
  unsafe fn draw_mask(&mut self, vertices: &[[f32; 2]], mode: GLenum, transform: &Matrix4<f32>) {
    if self.stencil_program.is_none() {
      match StencilProgram::new(self.version, &mut self.state) {
        Ok(program) => self.stencil_program = Some(program),

        Err(e) => {
          error!("cannot build the mask program: {}", e);
          panic!("mask program unavailable; clip stacks cannot be realized");
        }
      }
    }

    if let Some(ref program) = self.stencil_program {
      // the projection may reverse the winding of mask geometry
      let culling = self.state.set_face_culling(false);

      program.draw(&mut self.state, vertices, mode, transform);

      if culling == Some(true) {
        self.state.set_face_culling(true);
      }
    }
  }
}

unsafe impl<F> Clip for Gl<F>
where
  F: Flavor,
{
  unsafe fn set_scissor(&mut self, region: Option<ScissorRegion>) {
    match region {
      Some(region) => {
        self.state.set_scissor_test(true);
        self.state.set_scissor_box([
          region.x,
          region.y,
          region.width as GLint,
          region.height as GLint,
        ]);
      }

      None => self.state.set_scissor_test(false),
    }
  }

  unsafe fn set_mask_enabled(&mut self, enabled: bool) {
    self.state.set_stencil_test(enabled);
  }

  unsafe fn clear_mask(&mut self, value: u8) {
    self.state.clear_stencil(value as GLint);
  }

  unsafe fn set_mask_func(&mut self, comparison: Comparison, reference: u8, mask: u8) {
    self
      .state
      .set_stencil_func(comparison_to_glenum(comparison), reference as GLint, mask as GLuint);
  }

  unsafe fn set_mask_op(&mut self, op: StencilOp) {
    self.state.set_stencil_op(stencil_op_to_glenum(op));
  }

  unsafe fn set_mask_write_mask(&mut self, mask: u8) {
    self.state.set_stencil_write_mask(mask as GLuint);
  }

  unsafe fn set_color_depth_writes(&mut self, enabled: bool) {
    self.state.set_color_depth_writes(enabled);
  }

  unsafe fn draw_mask_rectangle(&mut self, rect: [f32; 4], transform: &Matrix4<f32>) {
    let [x0, y0, x1, y1] = rect;
    let vertices = [[x0, y0], [x1, y0], [x0, y1], [x1, y1]];

    self.draw_mask(&vertices, gl::TRIANGLE_STRIP, transform);
  }

  unsafe fn draw_mask_silhouette(&mut self, silhouette: &Silhouette, transform: &Matrix4<f32>) {
    self.draw_mask(
      silhouette.vertices(),
      opengl_mode(silhouette.topology()),
      transform,
    );
  }
}
