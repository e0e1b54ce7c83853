//! Clip realization backend interface.
//!
//! The scissor is mandatory. Every other slot drives the auxiliary mask plane and is only called
//! when the backend reports [`STENCIL_MASK`](crate::features::Features::STENCIL_MASK).

use cgmath::Matrix4;

use crate::scissor::ScissorRegion;
use crate::silhouette::Silhouette;
use crate::stencil::{Comparison, StencilOp};

/// Clip realization.
pub unsafe trait Clip {
  /// Enable the scissor with the given region (bottom-left origin), or disable it with `None`.
  unsafe fn set_scissor(&mut self, region: Option<ScissorRegion>);

  /// Enable or disable the mask test.
  unsafe fn set_mask_enabled(&mut self, enabled: bool) {
    let _ = enabled;
  }

  /// Clear the whole mask plane (within the scissor) to `value`, regardless of the write mask.
  unsafe fn clear_mask(&mut self, value: u8) {
    let _ = value;
  }

  /// Set the mask test.
  unsafe fn set_mask_func(&mut self, comparison: Comparison, reference: u8, mask: u8) {
    let _ = (comparison, reference, mask);
  }

  /// Operation applied to the mask for every fragment, whether it passes or fails the test.
  unsafe fn set_mask_op(&mut self, op: StencilOp) {
    let _ = op;
  }

  /// Bits of the mask plane writes are allowed to touch.
  unsafe fn set_mask_write_mask(&mut self, mask: u8) {
    let _ = mask;
  }

  /// Enable or disable color and depth writes.
  unsafe fn set_color_depth_writes(&mut self, enabled: bool) {
    let _ = enabled;
  }

  /// Draw a rectangle (`[x0, y0, x1, y1]` in model space) into the mask only.
  unsafe fn draw_mask_rectangle(&mut self, rect: [f32; 4], transform: &Matrix4<f32>) {
    let _ = (rect, transform);
  }

  /// Draw a silhouette into the mask only.
  unsafe fn draw_mask_silhouette(&mut self, silhouette: &Silhouette, transform: &Matrix4<f32>) {
    let _ = (silhouette, transform);
  }
}
