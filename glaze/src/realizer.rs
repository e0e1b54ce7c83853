//! Clip stack realization.
//!
//! Realizing a clip stack means configuring the backend so that fragments outside of the
//! intersection of every entry get discarded. The scissor takes care of the intersection of the
//! entries' bounds, which is exact for window rectangles and window-aligned rectangles. Other
//! entries are drawn into the auxiliary mask plane:
//!
//! - rectangles are intersected by counting: the first one sets the mask to `1`, each following
//!   one increments the mask inside of it and then decrements it everywhere, so only pixels
//!   covered by every rectangle keep the value `1`;
//! - silhouettes are rasterized with even-odd inversion of bit `0` (first entry) or bit `1`
//!   (merged entry); a merged entry then decrements the whole mask twice, leaving `1` only where
//!   both bits were set.
//!
//! The mask test is finally set to pass where the mask equals `1`.
//!
//! Offscreen framebuffers are rendered upside down, so their mask geometry is flipped vertically
//! to land inside the scissor region computed for them.

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, warn};

use crate::backend::clip::Clip as ClipBackend;
use crate::clip::{ArenaId, Bounds, ClipShape, ClipStack, ClipStackArena};
use crate::features::Features;
use crate::framebuffer::{Framebuffer, FramebufferId};
use crate::scissor::ScissorRegion;
use crate::silhouette::Silhouette;
use crate::stencil::{Comparison, StencilOp};

// Rectangle covering the whole clip space.
const FULL_QUAD: [f32; 4] = [-1., -1., 1., 1.];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct FlushedClip {
  arena: ArenaId,
  stack: ClipStack,
  framebuffer: FramebufferId,
  viewport_age: u64,
}

/// Realizes clip stacks, skipping the work when the realized stack is already current.
#[derive(Debug, Default)]
pub struct ClipStackRealizer {
  flushed: Option<FlushedClip>,
  warned_no_mask: bool,
}

impl ClipStackRealizer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Forget what was realized; the next flush always reaches the backend.
  ///
  /// Must be called whenever something else touches the scissor or the mask plane.
  pub fn invalidate(&mut self) {
    self.flushed = None;
  }

  /// Whether a stack is currently realized.
  pub fn is_valid(&self) -> bool {
    self.flushed.is_some()
  }

  /// Realize a clip stack for a framebuffer.
  pub fn flush<B>(
    &mut self,
    backend: &mut B,
    features: Features,
    arena: &ClipStackArena,
    stack: ClipStack,
    framebuffer: &Framebuffer,
  ) where
    B: ?Sized + ClipBackend,
  {
    let workaround = features.contains(Features::VIEWPORT_SCISSOR_WORKAROUND);
    let has_mask = features.contains(Features::STENCIL_MASK);
    let flushed = FlushedClip {
      arena: arena.id(),
      stack,
      framebuffer: framebuffer.id(),
      viewport_age: framebuffer.viewport_age(),
    };

    if let Some(current) = self.flushed {
      let same = current.arena == flushed.arena
        && current.stack == flushed.stack
        && current.framebuffer == flushed.framebuffer
        && (!workaround || current.viewport_age == flushed.viewport_age);

      if same {
        return;
      }
    }

    self.flushed = Some(flushed);

    unsafe {
      if has_mask {
        backend.set_mask_enabled(false);
      }

      // without the workaround, an empty stack needs no scissor at all
      if stack.is_empty() && !workaround {
        debug!("flushed empty clip stack");
        backend.set_scissor(None);
        return;
      }

      let mut bounds = arena.bounds(stack);

      if workaround {
        let viewport = framebuffer.viewport();
        bounds = bounds.intersect(&Bounds::from_window_rect([
          viewport.x,
          viewport.y,
          viewport.x + viewport.width,
          viewport.y + viewport.height,
        ]));
      }

      if bounds.is_empty() {
        debug!("clip stack intersection is empty; discarding everything");
        backend.set_scissor(Some(ScissorRegion::EMPTY));
        return;
      }

      let region = scissor_region(&bounds, framebuffer);
      debug!(
        "flushing scissor to ({}, {}, {}, {})",
        region.x, region.y, region.width, region.height
      );
      backend.set_scissor(Some(region));

      let flip = framebuffer.is_offscreen();
      let mut using_mask = false;

      for entry in arena.entries(stack) {
        match entry.shape() {
          ClipShape::Silhouette {
            silhouette,
            transform,
          } => {
            if !has_mask {
              self.warn_no_mask();
              continue;
            }

            debug!("adding silhouette clip to the mask");
            let transform = mask_transform(transform, flip);
            add_mask_silhouette(backend, silhouette, &transform, using_mask);
            using_mask = true;
          }

          ClipShape::Rectangle {
            rect,
            transform,
            can_be_scissor: false,
          } => {
            if !has_mask {
              self.warn_no_mask();
              continue;
            }

            debug!("adding rectangle clip to the mask");
            let transform = mask_transform(transform, flip);
            add_mask_rectangle(backend, *rect, &transform, !using_mask);
            using_mask = true;
          }

          // realized by the scissor
          ClipShape::Rectangle { .. } | ClipShape::WindowRectangle => (),
        }
      }
    }
  }

  fn warn_no_mask(&mut self) {
    if !self.warned_no_mask {
      warn!("the backend has no mask plane; non-rectangular clips are approximated by their bounds");
      self.warned_no_mask = true;
    }
  }
}

// Window bounds (top-left origin) to a native scissor region (bottom-left origin for onscreen
// framebuffers).
fn scissor_region(bounds: &Bounds, framebuffer: &Framebuffer) -> ScissorRegion {
  let y = if framebuffer.is_offscreen() {
    bounds.y0
  } else {
    (framebuffer.height() as i64 - bounds.y1 as i64) as i32
  };

  ScissorRegion::new(bounds.x0, y, bounds.width(), bounds.height())
}

// Transform a mask shape is drawn with. The full-screen quad is symmetric and needs no flip.
fn mask_transform(transform: &Matrix4<f32>, flip: bool) -> Matrix4<f32> {
  if flip {
    Matrix4::from_nonuniform_scale(1., -1., 1.) * transform
  } else {
    *transform
  }
}

unsafe fn add_mask_rectangle<B>(backend: &mut B, rect: [f32; 4], transform: &Matrix4<f32>, first: bool)
where
  B: ?Sized + ClipBackend,
{
  if first {
    backend.set_mask_enabled(true);
    backend.clear_mask(0);

    // set the mask to 1 inside of the rectangle
    backend.set_mask_func(Comparison::Never, 0x1, 0x1);
    backend.set_mask_op(StencilOp::Replace);
    backend.draw_mask_rectangle(rect, transform);
  } else {
    // add 1 inside of the rectangle, then remove 1 everywhere
    backend.set_mask_func(Comparison::Never, 0x1, 0x3);
    backend.set_mask_op(StencilOp::Increment);
    backend.draw_mask_rectangle(rect, transform);

    backend.set_mask_op(StencilOp::Decrement);
    backend.draw_mask_rectangle(FULL_QUAD, &Matrix4::identity());
  }

  // restore the mask test
  backend.set_mask_func(Comparison::Equal, 0x1, 0x1);
  backend.set_mask_op(StencilOp::Keep);
}

unsafe fn add_mask_silhouette<B>(
  backend: &mut B,
  silhouette: &Silhouette,
  transform: &Matrix4<f32>,
  merge: bool,
) where
  B: ?Sized + ClipBackend,
{
  backend.set_mask_enabled(true);
  backend.set_color_depth_writes(false);

  if merge {
    backend.set_mask_write_mask(0x2);
    backend.set_mask_func(Comparison::LessOrEqual, 0x2, 0x6);
  } else {
    backend.clear_mask(0);
    backend.set_mask_write_mask(0x1);
    backend.set_mask_func(Comparison::LessOrEqual, 0x1, 0x3);
  }

  // even-odd fill of the silhouette
  backend.set_mask_op(StencilOp::Invert);
  backend.draw_mask_silhouette(silhouette, transform);

  if merge {
    // bring pixels with both bits set down to 1 and everything else to 0
    backend.set_mask_write_mask(0x3);
    backend.set_mask_func(Comparison::Never, 0x2, 0x3);
    backend.set_mask_op(StencilOp::Decrement);

    let identity = Matrix4::identity();
    backend.draw_mask_rectangle(FULL_QUAD, &identity);
    backend.draw_mask_rectangle(FULL_QUAD, &identity);
  }

  backend.set_mask_write_mask(0xff);
  backend.set_color_depth_writes(true);

  // restore the mask test
  backend.set_mask_func(Comparison::Equal, 0x1, 0x1);
  backend.set_mask_op(StencilOp::Keep);
}
