//! Framebuffer bookkeeping.
//!
//! The core doesn't create native framebuffers; it only needs to know their size, whether their
//! y axis is flipped (onscreen targets), their viewport and their current transforms to realize
//! clip stacks against them.

use cgmath::{ortho, Matrix4, SquareMatrix};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FRAMEBUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a framebuffer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FramebufferId(u64);

/// Kind of a framebuffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FramebufferKind {
  /// Window surface; its native origin is bottom-left.
  Onscreen,
  /// Render target backed by a texture; its native origin matches window coordinates.
  Offscreen,
}

/// Viewport, in window coordinates (top-left origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

impl Viewport {
  pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Viewport {
      x,
      y,
      width,
      height,
    }
  }
}

/// A render target as seen by clip realization.
#[derive(Debug)]
pub struct Framebuffer {
  id: FramebufferId,
  width: u32,
  height: u32,
  kind: FramebufferKind,
  viewport: Viewport,
  viewport_age: u64,
  projection: Matrix4<f32>,
  modelview: Matrix4<f32>,
}

impl Framebuffer {
  /// Create a framebuffer with a full-size viewport, an identity modelview and a projection
  /// mapping window coordinates (top-left origin) to the whole viewport.
  pub fn new(width: u32, height: u32, kind: FramebufferKind) -> Self {
    let (w, h) = (width as f32, height as f32);

    Framebuffer {
      id: FramebufferId(NEXT_FRAMEBUFFER_ID.fetch_add(1, Ordering::Relaxed)),
      width,
      height,
      kind,
      viewport: Viewport::new(0., 0., w, h),
      viewport_age: 0,
      projection: ortho(0., w, h, 0., -1., 1.),
      modelview: Matrix4::identity(),
    }
  }

  pub fn id(&self) -> FramebufferId {
    self.id
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn kind(&self) -> FramebufferKind {
    self.kind
  }

  pub fn is_offscreen(&self) -> bool {
    self.kind == FramebufferKind::Offscreen
  }

  pub fn viewport(&self) -> &Viewport {
    &self.viewport
  }

  /// Number of times the viewport changed.
  pub fn viewport_age(&self) -> u64 {
    self.viewport_age
  }

  /// Change the viewport; setting the same viewport again is not a change.
  pub fn set_viewport(&mut self, viewport: Viewport) {
    if self.viewport != viewport {
      self.viewport = viewport;
      self.viewport_age += 1;
    }
  }

  pub fn projection(&self) -> &Matrix4<f32> {
    &self.projection
  }

  pub fn set_projection(&mut self, projection: Matrix4<f32>) {
    self.projection = projection;
  }

  pub fn modelview(&self) -> &Matrix4<f32> {
    &self.modelview
  }

  pub fn set_modelview(&mut self, modelview: Matrix4<f32>) {
    self.modelview = modelview;
  }
}
