mod common;

use cgmath::{Matrix4, Rad, Vector3};
use common::{context_with, context_with_mask_plane, Call, Log, Stub};
use glaze::clip::{ClipStack, ClipStackArena};
use glaze::context::Context;
use glaze::features::Features;
use glaze::framebuffer::{Framebuffer, FramebufferKind, Viewport};
use glaze::scissor::ScissorRegion;
use glaze::silhouette::{Silhouette, Topology};
use glaze::stencil::{Comparison, StencilOp};
use std::rc::Rc;

const FULL_QUAD: [f32; 4] = [-1., -1., 1., 1.];

// rotated rectangles turn around the center of a 200x200 framebuffer
const CENTER: f32 = 100.;
const ANGLE: f32 = 0.5;

const OUTER: [f32; 4] = [-80., -80., 80., 80.];
const WIDE: [f32; 4] = [-70., -25., 70., 25.];
const TALL: [f32; 4] = [-25., -70., 25., 70.];
const TRIANGLE: [[f32; 2]; 3] = [[40., 40.], [180., 60.], [90., 170.]];
const OTHER_TRIANGLE: [[f32; 2]; 3] = [[20., 120.], [120., 20.], [190., 190.]];

#[derive(Clone, Copy, Debug)]
enum Shape {
  Rotated([f32; 4]),
  Triangle([[f32; 2]; 3]),
}

impl Shape {
  fn push(self, arena: &mut ClipStackArena, stack: ClipStack, fb: &Framebuffer) -> ClipStack {
    match self {
      Shape::Rotated(rect) => push_rotated(arena, stack, rect, fb),
      Shape::Triangle(vertices) => push_silhouette(arena, stack, vertices.to_vec(), fb),
    }
  }

  // signed distance to the outline of the shape at a window position, positive inside
  fn distance(self, [x, y]: [f32; 2]) -> f32 {
    match self {
      Shape::Rotated([x0, y0, x1, y1]) => {
        let (dx, dy) = (x - CENTER, y - CENTER);
        let (sin, cos) = ANGLE.sin_cos();
        let (lx, ly) = (cos * dx + sin * dy, cos * dy - sin * dx);

        (lx - x0).min(x1 - lx).min(ly - y0).min(y1 - ly)
      }

      Shape::Triangle([a, b, c]) => {
        let cross = |a: [f32; 2], b: [f32; 2], p: [f32; 2]| {
          (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
        };
        let sign = cross(a, b, c).signum();

        [(a, b), (b, c), (c, a)]
          .iter()
          .map(|&(u, v)| sign * cross(u, v, [x, y]) / (v[0] - u[0]).hypot(v[1] - u[1]))
          .fold(f32::INFINITY, f32::min)
      }
    }
  }
}

// Check that exactly the pixels covered by every shape survive the realized clip.
fn assert_clipped_to(ctx: &Context<Stub>, fb: &Framebuffer, shapes: &[Shape]) {
  let backend = ctx.backend();
  let mask = backend.mask.as_ref().unwrap();
  let mut visible = 0;

  for row in 0..mask.height {
    for col in 0..mask.width {
      // native rows of onscreen framebuffers go upwards
      let y = if fb.is_offscreen() {
        row as f32 + 0.5
      } else {
        (mask.height - row) as f32 - 0.5
      };
      let distance = shapes
        .iter()
        .map(|shape| shape.distance([col as f32 + 0.5, y]))
        .fold(f32::INFINITY, f32::min);

      // samples on an outline may go either way
      if distance.abs() < 0.01 {
        continue;
      }

      assert_eq!(
        mask.passes(col, row),
        distance > 0.,
        "pixel ({}, {}) of {:?}",
        col,
        row,
        shapes
      );

      if distance > 0. {
        visible += 1;
      }
    }
  }

  assert!(visible > 0, "{:?} clips everything away", shapes);
}

fn flush(
  ctx: &mut Context<Stub>,
  log: &Log,
  arena: &ClipStackArena,
  stack: ClipStack,
  framebuffer: &Framebuffer,
) -> Vec<Call> {
  log.take();
  ctx.flush_clip_stack(arena, stack, framebuffer);
  log.take()
}

fn push_rect(arena: &mut ClipStackArena, stack: ClipStack, rect: [f32; 4], fb: &Framebuffer) -> ClipStack {
  arena.push_rectangle(stack, rect, fb.modelview(), fb.projection(), fb.viewport())
}

fn push_rotated(arena: &mut ClipStackArena, stack: ClipStack, rect: [f32; 4], fb: &Framebuffer) -> ClipStack {
  let modelview = fb.modelview()
    * Matrix4::from_translation(Vector3::new(CENTER, CENTER, 0.))
    * Matrix4::from_angle_z(Rad(ANGLE));
  arena.push_rectangle(stack, rect, &modelview, fb.projection(), fb.viewport())
}

fn push_triangle(arena: &mut ClipStackArena, stack: ClipStack, fb: &Framebuffer) -> ClipStack {
  push_silhouette(arena, stack, vec![[0., 0.], [50., 0.], [25., 50.]], fb)
}

fn push_silhouette(
  arena: &mut ClipStackArena,
  stack: ClipStack,
  vertices: Vec<[f32; 2]>,
  fb: &Framebuffer,
) -> ClipStack {
  let silhouette = Silhouette::new(vertices, Topology::Triangles);
  let bounds = silhouette.bounds().unwrap();

  arena.push_primitive(
    stack,
    Rc::new(silhouette),
    bounds,
    fb.modelview(),
    fb.projection(),
    fb.viewport(),
  )
}

fn without_scissor(calls: Vec<Call>) -> Vec<Call> {
  calls
    .into_iter()
    .filter(|c| !matches!(c, Call::Scissor(_) | Call::MaskEnabled(false)))
    .collect()
}

#[test]
fn intersected_rectangles_use_the_scissor_only() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_rect(&mut arena, ClipStack::EMPTY, [0., 0., 100., 100.], &fb);
  let stack = push_rect(&mut arena, stack, [50., 50., 150., 150.], &fb);

  assert_eq!(
    flush(&mut ctx, &log, &arena, stack, &fb),
    vec![
      Call::MaskEnabled(false),
      Call::Scissor(Some(ScissorRegion::new(50, 50, 50, 50))),
    ]
  );

  // already realized
  assert!(flush(&mut ctx, &log, &arena, stack, &fb).is_empty());
}

#[test]
fn onscreen_scissor_is_flipped() {
  let (mut ctx, log) = context_with(Features::empty());
  let fb = Framebuffer::new(200, 100, FramebufferKind::Onscreen);
  let mut arena = ClipStackArena::new();

  let stack = arena.push_window_rectangle(ClipStack::EMPTY, 10, 20, 40, 20);

  assert_eq!(
    flush(&mut ctx, &log, &arena, stack, &fb),
    vec![Call::Scissor(Some(ScissorRegion::new(10, 60, 40, 20)))]
  );
}

#[test]
fn empty_stack_disables_the_scissor() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 100, FramebufferKind::Offscreen);
  let arena = ClipStackArena::new();

  assert_eq!(
    flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb),
    vec![Call::MaskEnabled(false), Call::Scissor(None)]
  );
}

#[test]
fn empty_intersection_discards_everything() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_rect(&mut arena, ClipStack::EMPTY, [0., 0., 50., 50.], &fb);
  let stack = push_rotated(&mut arena, stack, [-10., -10., 10., 10.], &fb);

  let calls = flush(&mut ctx, &log, &arena, stack, &fb);

  assert_eq!(
    calls,
    vec![Call::MaskEnabled(false), Call::Scissor(Some(ScissorRegion::EMPTY))]
  );
  assert!(!calls.iter().any(Call::is_mask));
}

#[test]
fn rotated_rectangles_are_intersected_in_the_mask() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let outer = [-40., -40., 40., 40.];
  let inner = [-30., -20., 30., 20.];
  let stack = push_rotated(&mut arena, ClipStack::EMPTY, outer, &fb);
  let stack = push_rotated(&mut arena, stack, inner, &fb);

  let calls = flush(&mut ctx, &log, &arena, stack, &fb);

  assert_eq!(calls[0], Call::MaskEnabled(false));
  assert!(matches!(calls[1], Call::Scissor(Some(region)) if !region.is_empty()));

  // head first: it initializes the mask, the older entry is counted in
  assert_eq!(
    calls[2..],
    [
      Call::MaskEnabled(true),
      Call::ClearMask(0),
      Call::MaskFunc(Comparison::Never, 0x1, 0x1),
      Call::MaskOp(StencilOp::Replace),
      Call::DrawRectangle(inner),
      Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
      Call::MaskOp(StencilOp::Keep),
      Call::MaskFunc(Comparison::Never, 0x1, 0x3),
      Call::MaskOp(StencilOp::Increment),
      Call::DrawRectangle(outer),
      Call::MaskOp(StencilOp::Decrement),
      Call::DrawRectangle(FULL_QUAD),
      Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
      Call::MaskOp(StencilOp::Keep),
    ]
  );
}

#[test]
fn silhouettes_are_drawn_with_inversion() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_triangle(&mut arena, ClipStack::EMPTY, &fb);
  let calls = flush(&mut ctx, &log, &arena, stack, &fb);

  assert_eq!(calls[1], Call::Scissor(Some(ScissorRegion::new(0, 0, 50, 50))));
  assert_eq!(
    without_scissor(calls),
    vec![
      Call::MaskEnabled(true),
      Call::ColorDepthWrites(false),
      Call::ClearMask(0),
      Call::MaskWriteMask(0x1),
      Call::MaskFunc(Comparison::LessOrEqual, 0x1, 0x3),
      Call::MaskOp(StencilOp::Invert),
      Call::DrawSilhouette(3),
      Call::MaskWriteMask(0xff),
      Call::ColorDepthWrites(true),
      Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
      Call::MaskOp(StencilOp::Keep),
    ]
  );
}

#[test]
fn silhouettes_merge_with_an_existing_mask() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_triangle(&mut arena, ClipStack::EMPTY, &fb);
  let rect = [-80., -80., 80., 80.];
  let stack = push_rotated(&mut arena, stack, rect, &fb);

  let calls = without_scissor(flush(&mut ctx, &log, &arena, stack, &fb));

  // the rotated rectangle is the head and initializes the mask
  assert_eq!(calls[4], Call::DrawRectangle(rect));
  assert_eq!(
    calls[7..],
    [
      Call::MaskEnabled(true),
      Call::ColorDepthWrites(false),
      Call::MaskWriteMask(0x2),
      Call::MaskFunc(Comparison::LessOrEqual, 0x2, 0x6),
      Call::MaskOp(StencilOp::Invert),
      Call::DrawSilhouette(3),
      Call::MaskWriteMask(0x3),
      Call::MaskFunc(Comparison::Never, 0x2, 0x3),
      Call::MaskOp(StencilOp::Decrement),
      Call::DrawRectangle(FULL_QUAD),
      Call::DrawRectangle(FULL_QUAD),
      Call::MaskWriteMask(0xff),
      Call::ColorDepthWrites(true),
      Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
      Call::MaskOp(StencilOp::Keep),
    ]
  );
}

#[test]
fn without_a_mask_plane_only_the_scissor_is_set() {
  let (mut ctx, log) = context_with(Features::empty());
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_triangle(&mut arena, ClipStack::EMPTY, &fb);
  let stack = push_rotated(&mut arena, stack, [-80., -80., 80., 80.], &fb);

  // bounds only
  assert_eq!(
    flush(&mut ctx, &log, &arena, stack, &fb),
    vec![Call::Scissor(Some(ScissorRegion::new(0, 0, 50, 50)))]
  );
}

#[test]
fn changes_are_detected() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let other_fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let base = push_rect(&mut arena, ClipStack::EMPTY, [0., 0., 100., 100.], &fb);
  let shared = arena.retain(base);
  let stack = push_rect(&mut arena, shared, [10., 10., 20., 20.], &fb);

  assert_eq!(flush(&mut ctx, &log, &arena, stack, &fb).len(), 2);

  // another framebuffer
  assert_eq!(flush(&mut ctx, &log, &arena, stack, &other_fb).len(), 2);
  assert!(flush(&mut ctx, &log, &arena, stack, &other_fb).is_empty());

  // another stack
  let popped = arena.pop(stack);
  assert_eq!(popped, base);
  assert_eq!(
    flush(&mut ctx, &log, &arena, popped, &other_fb),
    vec![
      Call::MaskEnabled(false),
      Call::Scissor(Some(ScissorRegion::new(0, 0, 100, 100))),
    ]
  );

  // state touched behind our back
  ctx.invalidate_clip_state();
  assert_eq!(flush(&mut ctx, &log, &arena, popped, &other_fb).len(), 2);

  arena.release(popped);
  arena.release(base);
  assert!(arena.is_empty());
}

#[test]
fn viewport_changes_only_matter_with_the_workaround() {
  let (mut ctx, log) = context_with(Features::empty());
  let mut fb = Framebuffer::new(200, 100, FramebufferKind::Offscreen);
  let arena = ClipStackArena::new();

  flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb);
  fb.set_viewport(Viewport::new(10., 10., 50., 50.));
  assert!(flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb).is_empty());

  let (mut ctx, log) = context_with(Features::VIEWPORT_SCISSOR_WORKAROUND);
  let mut fb = Framebuffer::new(200, 100, FramebufferKind::Offscreen);

  // an empty stack is clipped to the viewport
  assert_eq!(
    flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb),
    vec![Call::Scissor(Some(ScissorRegion::new(0, 0, 200, 100)))]
  );

  fb.set_viewport(Viewport::new(10., 10., 50., 50.));
  assert_eq!(
    flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb),
    vec![Call::Scissor(Some(ScissorRegion::new(10, 10, 50, 50)))]
  );

  // same viewport again
  fb.set_viewport(Viewport::new(10., 10., 50., 50.));
  assert!(flush(&mut ctx, &log, &arena, ClipStack::EMPTY, &fb).is_empty());
}

#[test]
fn masks_land_inside_the_scissor() {
  // offscreen framebuffers are upside down: the top of the framebuffer is the first native row
  let kinds = [
    (FramebufferKind::Offscreen, ScissorRegion::new(0, 0, 50, 50), [0, 0, 50]),
    (FramebufferKind::Onscreen, ScissorRegion::new(0, 150, 50, 50), [200, 200, 150]),
  ];

  for (kind, region, rows) in kinds {
    let (mut ctx, log) = context_with_mask_plane(200, 200);
    let fb = Framebuffer::new(200, 200, kind);
    let mut arena = ClipStackArena::new();

    let stack = push_triangle(&mut arena, ClipStack::EMPTY, &fb);
    let calls = flush(&mut ctx, &log, &arena, stack, &fb);
    assert_eq!(calls[1], Call::Scissor(Some(region)));

    let drawn: Vec<i32> = ctx.backend().mask_draws[0]
      .iter()
      .map(|v| ((v[1] + 1.) / 2. * 200.).round() as i32)
      .collect();
    assert_eq!(drawn, rows, "{:?}", kind);

    let triangle = Shape::Triangle([[0., 0.], [50., 0.], [25., 50.]]);
    assert_clipped_to(&ctx, &fb, &[triangle]);
  }
}

#[test]
fn three_rectangles_and_a_silhouette() {
  let (mut ctx, log) = context_with(Features::STENCIL_MASK);
  let fb = Framebuffer::new(200, 200, FramebufferKind::Offscreen);
  let mut arena = ClipStackArena::new();

  let stack = push_rotated(&mut arena, ClipStack::EMPTY, OUTER, &fb);
  let stack = push_rotated(&mut arena, stack, WIDE, &fb);
  let stack = push_rotated(&mut arena, stack, TALL, &fb);
  let stack = push_silhouette(&mut arena, stack, TRIANGLE.to_vec(), &fb);

  let counted = |rect| {
    vec![
      Call::MaskFunc(Comparison::Never, 0x1, 0x3),
      Call::MaskOp(StencilOp::Increment),
      Call::DrawRectangle(rect),
      Call::MaskOp(StencilOp::Decrement),
      Call::DrawRectangle(FULL_QUAD),
      Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
      Call::MaskOp(StencilOp::Keep),
    ]
  };

  // the silhouette is the head and initializes the mask; each rectangle is counted in
  let mut expected = vec![
    Call::MaskEnabled(true),
    Call::ColorDepthWrites(false),
    Call::ClearMask(0),
    Call::MaskWriteMask(0x1),
    Call::MaskFunc(Comparison::LessOrEqual, 0x1, 0x3),
    Call::MaskOp(StencilOp::Invert),
    Call::DrawSilhouette(3),
    Call::MaskWriteMask(0xff),
    Call::ColorDepthWrites(true),
    Call::MaskFunc(Comparison::Equal, 0x1, 0x1),
    Call::MaskOp(StencilOp::Keep),
  ];
  expected.extend(counted(TALL));
  expected.extend(counted(WIDE));
  expected.extend(counted(OUTER));

  assert_eq!(without_scissor(flush(&mut ctx, &log, &arena, stack, &fb)), expected);
}

#[test]
fn nested_masks_keep_the_intersection() {
  let arrangements = [
    // silhouette first, rectangles counted in
    vec![
      Shape::Rotated(OUTER),
      Shape::Rotated(WIDE),
      Shape::Rotated(TALL),
      Shape::Triangle(TRIANGLE),
    ],
    // rectangles first, silhouette merged
    vec![
      Shape::Triangle(TRIANGLE),
      Shape::Rotated(OUTER),
      Shape::Rotated(WIDE),
      Shape::Rotated(TALL),
    ],
    // interleaved, with a silhouette merged into another one
    vec![
      Shape::Rotated(WIDE),
      Shape::Triangle(TRIANGLE),
      Shape::Rotated(TALL),
      Shape::Triangle(OTHER_TRIANGLE),
    ],
    vec![
      Shape::Triangle(OTHER_TRIANGLE),
      Shape::Rotated(OUTER),
      Shape::Triangle(TRIANGLE),
      Shape::Rotated(TALL),
      Shape::Rotated(WIDE),
    ],
  ];

  for kind in [FramebufferKind::Offscreen, FramebufferKind::Onscreen] {
    for shapes in &arrangements {
      let (mut ctx, log) = context_with_mask_plane(200, 200);
      let fb = Framebuffer::new(200, 200, kind);
      let mut arena = ClipStackArena::new();

      let stack = shapes
        .iter()
        .fold(ClipStack::EMPTY, |stack, shape| shape.push(&mut arena, stack, &fb));
      flush(&mut ctx, &log, &arena, stack, &fb);

      assert_clipped_to(&ctx, &fb, shapes);
    }
  }
}
