//! Clip stacks.
//!
//! A clip stack is a persistent, singly-linked list of clip entries: pushing an entry creates a
//! new node pointing at the previous head, so several stacks can share their tail. Nodes live in
//! a [`ClipStackArena`] and are reference-counted by hand; a [`ClipStack`] is a plain copyable
//! handle to the head node (or to nothing, for the empty stack).
//!
//! Handle ownership works as follows:
//!
//! - every `push_*` method consumes the reference held by the handle it's given and returns a
//!   handle owning one reference to the new node;
//! - [`ClipStackArena::pop`] consumes the reference of the given handle and returns a handle
//!   owning a reference to the parent;
//! - [`ClipStackArena::retain`] and [`ClipStackArena::release`] add and drop references.
//!
//! Releasing the last reference of a node frees it and releases its parent in turn. Node keys are
//! generational, so a handle to a freed node never aliases a node allocated later.

use cgmath::{Matrix4, Vector4};
use slotmap::{new_key_type, SlotMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::framebuffer::Viewport;
use crate::silhouette::Silhouette;

new_key_type! {
  /// Key of a clip node in its arena.
  pub struct ClipKey;
}

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a [`ClipStackArena`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ArenaId(u64);

/// Handle to a clip stack.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClipStack(Option<ClipKey>);

impl ClipStack {
  /// The empty stack, clipping nothing.
  pub const EMPTY: ClipStack = ClipStack(None);

  pub fn is_empty(&self) -> bool {
    self.0.is_none()
  }

  /// Key of the head node.
  pub fn key(&self) -> Option<ClipKey> {
    self.0
  }
}

/// Integer window-space bounds, top-left origin; `x1` and `y1` are exclusive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Bounds {
  pub x0: i32,
  pub y0: i32,
  pub x1: i32,
  pub y1: i32,
}

impl Bounds {
  /// Bounds of a stack with no entry.
  pub const UNBOUNDED: Bounds = Bounds {
    x0: 0,
    y0: 0,
    x1: i32::MAX,
    y1: i32::MAX,
  };

  pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
    Bounds { x0, y0, x1, y1 }
  }

  /// Round floating-point window bounds outwards.
  ///
  /// Values within a thousandth of an integer are snapped to it first, so that exact coordinates
  /// don't grow by a pixel because of rounding noise in the transforms.
  pub fn from_window_rect([x0, y0, x1, y1]: [f32; 4]) -> Self {
    fn snap(v: f32) -> f32 {
      let rounded = v.round();

      if (v - rounded).abs() < 1e-3 {
        rounded
      } else {
        v
      }
    }

    Bounds {
      x0: snap(x0).floor() as i32,
      y0: snap(y0).floor() as i32,
      x1: snap(x1).ceil() as i32,
      y1: snap(y1).ceil() as i32,
    }
  }

  pub fn intersect(&self, other: &Bounds) -> Bounds {
    Bounds {
      x0: self.x0.max(other.x0),
      y0: self.y0.max(other.y0),
      x1: self.x1.min(other.x1),
      y1: self.y1.min(other.y1),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.x0 >= self.x1 || self.y0 >= self.y1
  }

  pub fn width(&self) -> u32 {
    (self.x1 as i64 - self.x0 as i64).max(0) as u32
  }

  pub fn height(&self) -> u32 {
    (self.y1 as i64 - self.y0 as i64).max(0) as u32
  }
}

/// Shape of a clip entry.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipShape {
  /// Rectangle `[x0, y0, x1, y1]` in model space.
  Rectangle {
    rect: [f32; 4],
    /// Model space to clip space transform at push time.
    transform: Matrix4<f32>,
    /// The transformed rectangle is window-aligned, so the scissor alone realizes it.
    can_be_scissor: bool,
  },

  /// Arbitrary geometry in model space.
  Silhouette {
    silhouette: Rc<Silhouette>,
    /// Model space to clip space transform at push time.
    transform: Matrix4<f32>,
  },

  /// Rectangle in window coordinates; always realized by the scissor.
  WindowRectangle,
}

/// A node of a clip stack.
#[derive(Clone, Debug)]
pub struct ClipEntry {
  parent: ClipStack,
  bounds: Bounds,
  shape: ClipShape,
  refs: u32,
}

impl ClipEntry {
  pub fn parent(&self) -> ClipStack {
    self.parent
  }

  /// Window-space bounds of this entry alone.
  pub fn bounds(&self) -> &Bounds {
    &self.bounds
  }

  pub fn shape(&self) -> &ClipShape {
    &self.shape
  }

  pub fn ref_count(&self) -> u32 {
    self.refs
  }
}

/// Owner of clip stack nodes.
#[derive(Debug)]
pub struct ClipStackArena {
  id: ArenaId,
  nodes: SlotMap<ClipKey, ClipEntry>,
}

impl Default for ClipStackArena {
  fn default() -> Self {
    Self::new()
  }
}

impl ClipStackArena {
  pub fn new() -> Self {
    ClipStackArena {
      id: ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)),
      nodes: SlotMap::with_key(),
    }
  }

  pub fn id(&self) -> ArenaId {
    self.id
  }

  /// Number of live nodes.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Head entry of a stack.
  pub fn entry(&self, stack: ClipStack) -> Option<&ClipEntry> {
    stack.0.and_then(|key| self.nodes.get(key))
  }

  /// Iterate over the entries of a stack, from head to root.
  pub fn entries(&self, stack: ClipStack) -> Entries {
    Entries {
      arena: self,
      current: stack,
    }
  }

  fn push(&mut self, parent: ClipStack, bounds: Bounds, shape: ClipShape) -> ClipStack {
    assert!(
      parent.0.map_or(true, |key| self.nodes.contains_key(key)),
      "pushing onto a freed clip stack"
    );

    // the reference held by `parent` moves into the new node
    let key = self.nodes.insert(ClipEntry {
      parent,
      bounds,
      shape,
      refs: 1,
    });

    ClipStack(Some(key))
  }

  /// Push a model-space rectangle `[x0, y0, x1, y1]`.
  pub fn push_rectangle(
    &mut self,
    stack: ClipStack,
    rect: [f32; 4],
    modelview: &Matrix4<f32>,
    projection: &Matrix4<f32>,
    viewport: &Viewport,
  ) -> ClipStack {
    let transform = projection * modelview;
    let [x0, y0, x1, y1] = rect;
    let corners = [
      project(&transform, viewport, x0, y0),
      project(&transform, viewport, x1, y0),
      project(&transform, viewport, x1, y1),
      project(&transform, viewport, x0, y1),
    ];

    let [p0, p1, p2, p3] = corners;
    let can_be_scissor = (p0[1] == p1[1] && p2[1] == p3[1] && p0[0] == p3[0] && p1[0] == p2[0])
      || (p0[0] == p1[0] && p2[0] == p3[0] && p0[1] == p3[1] && p1[1] == p2[1]);

    let bounds = Bounds::from_window_rect(corner_bounds(&corners));

    self.push(
      stack,
      bounds,
      ClipShape::Rectangle {
        rect,
        transform,
        can_be_scissor,
      },
    )
  }

  /// Push a rectangle in window coordinates.
  pub fn push_window_rectangle(
    &mut self,
    stack: ClipStack,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
  ) -> ClipStack {
    let extent = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
    let bounds = Bounds::new(
      x,
      y,
      x.saturating_add(extent(width)),
      y.saturating_add(extent(height)),
    );

    self.push(stack, bounds, ClipShape::WindowRectangle)
  }

  /// Push a silhouette, given its model-space bounding box `[x0, y0, x1, y1]`.
  pub fn push_primitive(
    &mut self,
    stack: ClipStack,
    silhouette: Rc<Silhouette>,
    bounds: [f32; 4],
    modelview: &Matrix4<f32>,
    projection: &Matrix4<f32>,
    viewport: &Viewport,
  ) -> ClipStack {
    let transform = projection * modelview;
    let [x0, y0, x1, y1] = bounds;
    let corners = [
      project(&transform, viewport, x0, y0),
      project(&transform, viewport, x1, y0),
      project(&transform, viewport, x1, y1),
      project(&transform, viewport, x0, y1),
    ];
    let bounds = Bounds::from_window_rect(corner_bounds(&corners));

    self.push(
      stack,
      bounds,
      ClipShape::Silhouette {
        silhouette,
        transform,
      },
    )
  }

  /// Drop the head entry.
  ///
  /// # Panics
  ///
  /// Panics when popping the empty stack.
  pub fn pop(&mut self, stack: ClipStack) -> ClipStack {
    let parent = match self.entry(stack) {
      Some(entry) => entry.parent,
      None => panic!("cannot pop an empty or freed clip stack"),
    };

    self.retain(parent);
    self.release(stack);

    parent
  }

  /// Add a reference to a stack.
  pub fn retain(&mut self, stack: ClipStack) -> ClipStack {
    if let Some(key) = stack.0 {
      match self.nodes.get_mut(key) {
        Some(node) => node.refs += 1,
        None => panic!("retaining a freed clip stack"),
      }
    }

    stack
  }

  /// Drop a reference to a stack, freeing the nodes nobody refers to anymore.
  pub fn release(&mut self, stack: ClipStack) {
    let mut current = stack;

    while let Some(key) = current.0 {
      match self.nodes.get_mut(key) {
        Some(node) if node.refs > 1 => {
          node.refs -= 1;
          return;
        }

        Some(_) => {
          current = self.nodes.remove(key).map_or(ClipStack::EMPTY, |node| node.parent);
        }

        None => panic!("releasing a freed clip stack"),
      }
    }
  }

  /// Intersection of the bounds of every entry of a stack.
  pub fn bounds(&self, stack: ClipStack) -> Bounds {
    self
      .entries(stack)
      .fold(Bounds::UNBOUNDED, |acc, entry| acc.intersect(&entry.bounds))
  }
}

/// Iterator over the entries of a clip stack, from head to root.
#[derive(Debug)]
pub struct Entries<'a> {
  arena: &'a ClipStackArena,
  current: ClipStack,
}

impl<'a> Iterator for Entries<'a> {
  type Item = &'a ClipEntry;

  fn next(&mut self) -> Option<Self::Item> {
    let entry = self.arena.entry(self.current)?;
    self.current = entry.parent;
    Some(entry)
  }
}

// Model space to window space, top-left origin.
fn project(transform: &Matrix4<f32>, viewport: &Viewport, x: f32, y: f32) -> [f32; 2] {
  let clip = transform * Vector4::new(x, y, 0., 1.);
  let (nx, ny) = (clip.x / clip.w, clip.y / clip.w);

  [
    (nx + 1.) * viewport.width / 2. + viewport.x,
    (1. - ny) * viewport.height / 2. + viewport.y,
  ]
}

fn corner_bounds(corners: &[[f32; 2]; 4]) -> [f32; 4] {
  corners.iter().fold(
    [f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY],
    |[x0, y0, x1, y1], [x, y]| [x0.min(*x), y0.min(*y), x1.max(*x), y1.max(*y)],
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::framebuffer::{Framebuffer, FramebufferKind};
  use crate::silhouette::Topology;
  use cgmath::{Rad, SquareMatrix};

  fn push_rect(arena: &mut ClipStackArena, stack: ClipStack, fb: &Framebuffer, rect: [f32; 4]) -> ClipStack {
    arena.push_rectangle(stack, rect, fb.modelview(), fb.projection(), fb.viewport())
  }

  #[test]
  fn rectangle_bounds() {
    let fb = Framebuffer::new(256, 256, FramebufferKind::Offscreen);
    let mut arena = ClipStackArena::new();
    let stack = push_rect(&mut arena, ClipStack::EMPTY, &fb, [10., 20., 100.5, 40.]);

    let entry = arena.entry(stack).unwrap();
    assert_eq!(*entry.bounds(), Bounds::new(10, 20, 101, 40));
    assert!(matches!(
      entry.shape(),
      ClipShape::Rectangle {
        can_be_scissor: true,
        ..
      }
    ));
  }

  #[test]
  fn rotated_rectangle_cannot_be_scissor() {
    let mut fb = Framebuffer::new(256, 256, FramebufferKind::Offscreen);
    fb.set_modelview(
      Matrix4::from_translation([128., 128., 0.].into()) * Matrix4::from_angle_z(Rad(0.5f32)),
    );

    let mut arena = ClipStackArena::new();
    let stack = push_rect(&mut arena, ClipStack::EMPTY, &fb, [-10., -10., 10., 10.]);

    assert!(matches!(
      arena.entry(stack).unwrap().shape(),
      ClipShape::Rectangle {
        can_be_scissor: false,
        ..
      }
    ));
  }

  #[test]
  fn stack_bounds_intersect() {
    let fb = Framebuffer::new(256, 256, FramebufferKind::Offscreen);
    let mut arena = ClipStackArena::new();
    let stack = push_rect(&mut arena, ClipStack::EMPTY, &fb, [0., 0., 100., 100.]);
    let stack = arena.push_window_rectangle(stack, 50, 50, 100, 100);

    assert_eq!(arena.bounds(stack), Bounds::new(50, 50, 100, 100));
    assert_eq!(arena.bounds(ClipStack::EMPTY), Bounds::UNBOUNDED);
    assert_eq!(arena.entries(stack).count(), 2);
  }

  #[test]
  fn shared_tails_are_refcounted() {
    let mut arena = ClipStackArena::new();
    let base = arena.push_window_rectangle(ClipStack::EMPTY, 0, 0, 10, 10);

    // two stacks sharing `base`
    let shared = arena.retain(base);
    let a = arena.push_window_rectangle(shared, 1, 1, 5, 5);
    let b = arena.push_window_rectangle(base, 2, 2, 5, 5);
    assert_eq!(arena.len(), 3);
    assert_eq!(arena.entry(base).unwrap().ref_count(), 2);

    arena.release(a);
    assert_eq!(arena.len(), 2);
    assert_eq!(arena.entry(base).unwrap().ref_count(), 1);

    arena.release(b);
    assert!(arena.is_empty());
  }

  #[test]
  fn pop_returns_parent() {
    let mut arena = ClipStackArena::new();
    let base = arena.push_window_rectangle(ClipStack::EMPTY, 0, 0, 10, 10);
    let top = arena.push_window_rectangle(base, 1, 1, 5, 5);

    let popped = arena.pop(top);
    assert_eq!(popped, base);
    assert_eq!(arena.len(), 1);
    assert_eq!(arena.entry(popped).unwrap().ref_count(), 1);

    assert_eq!(arena.pop(popped), ClipStack::EMPTY);
    assert!(arena.is_empty());
  }

  #[test]
  fn stale_handles_do_not_alias() {
    let mut arena = ClipStackArena::new();
    let old = arena.push_window_rectangle(ClipStack::EMPTY, 0, 0, 10, 10);
    arena.release(old);

    let new = arena.push_window_rectangle(ClipStack::EMPTY, 0, 0, 10, 10);
    assert_ne!(old, new);
    assert!(arena.entry(old).is_none());
  }

  #[test]
  fn huge_window_rectangles_saturate() {
    let mut arena = ClipStackArena::new();
    let stack = arena.push_window_rectangle(ClipStack::EMPTY, -10, 5, u32::MAX, 1 << 31);

    assert_eq!(arena.bounds(stack), Bounds::new(-10, 5, i32::MAX - 10, i32::MAX));
    assert!(!arena.bounds(stack).is_empty());
  }

  #[test]
  fn primitive_bounds() {
    let fb = Framebuffer::new(256, 256, FramebufferKind::Offscreen);
    let mut arena = ClipStackArena::new();
    let silhouette = Rc::new(Silhouette::new(
      vec![[10., 10.], [60., 10.], [10., 30.]],
      Topology::Triangles,
    ));
    let bounds = silhouette.bounds().unwrap();
    let stack = arena.push_primitive(
      ClipStack::EMPTY,
      silhouette,
      bounds,
      &Matrix4::identity(),
      fb.projection(),
      fb.viewport(),
    );

    assert_eq!(*arena.entry(stack).unwrap().bounds(), Bounds::new(10, 10, 60, 30));
  }
}
