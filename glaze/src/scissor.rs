//! Scissor region.
//!
//! The scissor test discards every fragment outside of a window-aligned rectangle. It is the fast
//! path of clip realization.

/// The region outside of which fragments are discarded, in framebuffer pixels with a bottom-left
/// origin.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ScissorRegion {
  /// The x position of the region. Might be negative when clip shapes leave the framebuffer.
  pub x: i32,

  /// The y position of the region.
  pub y: i32,

  /// The width of the region.
  pub width: u32,

  /// The height of the region.
  pub height: u32,
}

impl ScissorRegion {
  /// A region discarding every fragment.
  pub const EMPTY: ScissorRegion = ScissorRegion {
    x: 0,
    y: 0,
    width: 0,
    height: 0,
  };

  pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
    ScissorRegion {
      x,
      y,
      width,
      height,
    }
  }

  /// Does the region discard everything?
  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }
}
