//! Recording backend shared by the integration tests.
//!
//! Every native call is appended to a shared log, which stays readable after the context owning
//! the backend is gone.

#![allow(dead_code)]

use cgmath::{Matrix4, Vector4};
use glaze::backend::clip::Clip;
use glaze::backend::features::Features as FeaturesBackend;
use glaze::backend::pixel::Pixel;
use glaze::backend::sampler::Sampler;
use glaze::backend::texture::{ForeignInfo, Texture};
use glaze::bitmap::Bitmap;
use glaze::config::Config;
use glaze::context::Context;
use glaze::features::{Capabilities, Features, Limits};
use glaze::pixel::{NativeFormat, PixelFormat};
use glaze::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use glaze::scissor::ScissorRegion;
use glaze::silhouette::{Silhouette, Topology};
use glaze::stencil::{Comparison, StencilOp};
use glaze::texture::{FirstPixel, TextureTarget};
use glaze::{Error, ErrorDomain};
use std::cell::RefCell;
use std::rc::Rc;

const FORMATS: [PixelFormat; 11] = [
  PixelFormat::A8,
  PixelFormat::Rg88,
  PixelFormat::Rgb565,
  PixelFormat::Rgb888,
  PixelFormat::Bgr888,
  PixelFormat::Rgba8888,
  PixelFormat::Rgba8888Pre,
  PixelFormat::Bgra8888,
  PixelFormat::Bgra8888Pre,
  PixelFormat::Rgba4444,
  PixelFormat::Rgba5551,
];

/// Native code of a pixel format in the stub.
pub fn code(format: PixelFormat) -> u32 {
  FORMATS
    .iter()
    .position(|f| *f == format)
    .map_or(u32::MAX, |i| i as u32)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  CreateSampler(SamplerState),
  DestroySampler(u32),
  BindSampler(u32, u32),
  GenTexture(TextureTarget, u32),
  DeleteTexture(u32),
  SizeSupported([u32; 3]),
  TextureStorage(u32, [u32; 3]),
  TextureUpload(u32, [u32; 3]),
  BindForeign(u32),
  QueryTextureParameters(u32),
  SetFilters(u32, MinFilter, MagFilter),
  SetWrapModes(u32, WrapMode, WrapMode, Option<WrapMode>),
  GenerateMipmap(u32),
  LegacyGenerateMipmap(u32, Vec<u8>),
  BindTexture(u32, u32),
  Scissor(Option<ScissorRegion>),
  MaskEnabled(bool),
  ClearMask(u8),
  MaskFunc(Comparison, u8, u8),
  MaskOp(StencilOp),
  MaskWriteMask(u8),
  ColorDepthWrites(bool),
  DrawRectangle([f32; 4]),
  DrawSilhouette(usize),
}

impl Call {
  /// Whether the call touches the mask plane.
  pub fn is_mask(&self) -> bool {
    matches!(
      self,
      Call::MaskEnabled(true)
        | Call::ClearMask(_)
        | Call::MaskFunc(..)
        | Call::MaskOp(_)
        | Call::MaskWriteMask(_)
        | Call::ColorDepthWrites(_)
        | Call::DrawRectangle(_)
        | Call::DrawSilhouette(_)
    )
  }
}

/// Shared call log.
#[derive(Clone, Debug, Default)]
pub struct Log(Rc<RefCell<Vec<Call>>>);

impl Log {
  fn push(&self, call: Call) {
    self.0.borrow_mut().push(call);
  }

  /// Take every call recorded so far.
  pub fn take(&self) -> Vec<Call> {
    self.0.borrow_mut().drain(..).collect()
  }

  pub fn calls(&self) -> Vec<Call> {
    self.0.borrow().clone()
  }

  pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
    self.0.borrow().iter().filter(|c| pred(c)).count()
  }
}

/// 8-bit mask plane of a framebuffer, behaving like a GL stencil buffer.
///
/// Pixels are addressed in native coordinates: column from the left, row from the bottom. The
/// plane also tracks the scissor, which restricts both clears and draws.
#[derive(Clone, Debug)]
pub struct MaskPlane {
  pub width: u32,
  pub height: u32,
  values: Vec<u8>,
  enabled: bool,
  scissor: Option<ScissorRegion>,
  func: (Comparison, u8, u8),
  op: StencilOp,
  write_mask: u8,
}

impl MaskPlane {
  pub fn new(width: u32, height: u32) -> Self {
    MaskPlane {
      width,
      height,
      values: vec![0; (width * height) as usize],
      enabled: false,
      scissor: None,
      func: (Comparison::Equal, 0x1, 0x1),
      op: StencilOp::Keep,
      write_mask: 0xff,
    }
  }

  pub fn value(&self, col: u32, row: u32) -> u8 {
    self.values[(row * self.width + col) as usize]
  }

  fn in_scissor(&self, col: u32, row: u32) -> bool {
    match self.scissor {
      Some(r) => {
        let (col, row) = (col as i32, row as i32);
        col >= r.x && row >= r.y && col < r.x + r.width as i32 && row < r.y + r.height as i32
      }

      None => true,
    }
  }

  fn test(&self, value: u8) -> bool {
    let (comparison, reference, mask) = self.func;
    let (a, b) = (reference & mask, value & mask);

    match comparison {
      Comparison::Never => false,
      Comparison::Equal => a == b,
      Comparison::LessOrEqual => a <= b,
    }
  }

  fn apply(&self, value: u8) -> u8 {
    let result = match self.op {
      StencilOp::Keep => value,
      StencilOp::Replace => self.func.1,
      StencilOp::Increment => value.saturating_add(1),
      StencilOp::Decrement => value.saturating_sub(1),
      StencilOp::Invert => !value,
    };

    (value & !self.write_mask) | (result & self.write_mask)
  }

  // clears ignore the write mask but not the scissor
  fn clear(&mut self, value: u8) {
    for row in 0..self.height {
      for col in 0..self.width {
        if self.in_scissor(col, row) {
          self.values[(row * self.width + col) as usize] = value;
        }
      }
    }
  }

  // rasterize triangles given in clip space, sampling pixel centers; every covered fragment is
  // updated whatever the test outcome, since the failing and passing ops are the same
  fn draw(&mut self, triangles: &[[[f32; 2]; 3]]) {
    if !self.enabled {
      return;
    }

    let triangles: Vec<_> = triangles
      .iter()
      .map(|t| [self.snap(t[0]), self.snap(t[1]), self.snap(t[2])])
      .collect();

    for row in 0..self.height {
      for col in 0..self.width {
        if !self.in_scissor(col, row) {
          continue;
        }

        let center = [col as i64 * SUBPIXELS + SUBPIXELS / 2, row as i64 * SUBPIXELS + SUBPIXELS / 2];
        let i = (row * self.width + col) as usize;

        for _ in triangles.iter().filter(|t| covers(t, center)) {
          self.values[i] = self.apply(self.values[i]);
        }
      }
    }
  }

  // clip space to window space, in subpixels
  fn snap(&self, [x, y]: [f32; 2]) -> [i64; 2] {
    let to_window = |v: f32, extent: u32| ((v + 1.) / 2. * (extent as i64 * SUBPIXELS) as f32).round() as i64;
    [to_window(x, self.width), to_window(y, self.height)]
  }

  /// Whether a fragment at a pixel survives the scissor and the mask test.
  pub fn passes(&self, col: u32, row: u32) -> bool {
    self.in_scissor(col, row) && (!self.enabled || self.test(self.value(col, row)))
  }
}

const SUBPIXELS: i64 = 256;

// Coverage with a top-left style tie-break: of two triangles sharing an edge, exactly one owns the
// samples lying on it.
fn covers(triangle: &[[i64; 2]; 3], p: [i64; 2]) -> bool {
  let edge = |a: [i64; 2], b: [i64; 2], p: [i64; 2]| {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
  };
  let owns = |a: [i64; 2], b: [i64; 2]| b[1] < a[1] || (b[1] == a[1] && b[0] < a[0]);

  let [a, mut b, mut c] = *triangle;
  let area = edge(a, b, c);

  if area == 0 {
    return false;
  } else if area < 0 {
    std::mem::swap(&mut b, &mut c);
  }

  [(a, b), (b, c), (c, a)].iter().all(|&(u, v)| {
    let e = edge(u, v, p);
    e > 0 || (e == 0 && owns(u, v))
  })
}

fn to_clip(transform: &Matrix4<f32>, [x, y]: [f32; 2]) -> [f32; 2] {
  let v = transform * Vector4::new(x, y, 0., 1.);
  [v.x / v.w, v.y / v.w]
}

fn triangles(vertices: &[[f32; 2]], topology: Topology) -> Vec<[[f32; 2]; 3]> {
  match topology {
    Topology::Triangles => vertices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
    Topology::TriangleStrip => vertices.windows(3).map(|t| [t[0], t[1], t[2]]).collect(),
    Topology::TriangleFan => vertices
      .windows(2)
      .skip(1)
      .map(|t| [vertices[0], t[0], t[1]])
      .collect(),
  }
}

/// Backend recording every call.
#[derive(Debug)]
pub struct Stub {
  pub log: Log,
  pub capabilities: Capabilities,
  /// Make storage allocation and uploads fail with an out-of-memory error.
  pub out_of_memory: bool,
  /// Make binding foreign textures fail.
  pub reject_foreign: bool,
  /// What querying a foreign texture reports.
  pub foreign_info: ForeignInfo,
  /// Largest extent the stub accepts.
  pub max_size: u32,
  /// Mask plane mask calls are simulated on, if any.
  pub mask: Option<MaskPlane>,
  /// Clip space vertices of every mask draw.
  pub mask_draws: Vec<Vec<[f32; 2]>>,
  next: u32,
}

impl Stub {
  pub fn new(features: Features) -> Self {
    Stub {
      log: Log::default(),
      capabilities: Capabilities::new(
        features,
        Limits {
          max_texture_size: 4096,
          max_3d_texture_size: 512,
          max_rectangle_texture_size: 4096,
        },
      ),
      out_of_memory: false,
      reject_foreign: false,
      foreign_info: ForeignInfo::default(),
      max_size: u32::MAX,
      mask: None,
      mask_draws: Vec::new(),
      next: 0,
    }
  }

  // record a mask draw and rasterize it
  fn draw_mask(&mut self, vertices: Vec<[f32; 2]>, topology: Topology) {
    if let Some(ref mut mask) = self.mask {
      mask.draw(&triangles(&vertices, topology));
    }

    self.mask_draws.push(vertices);
  }
}

/// Build a context over a stub, returning the context and its call log.
pub fn context(stub: Stub) -> (Context<Stub>, Log) {
  let _ = env_logger::builder().is_test(true).try_init();

  let log = stub.log.clone();
  let ctx = Context::new(stub, Config::default()).unwrap();

  (ctx, log)
}

/// Build a context over a stub with the given features.
pub fn context_with(features: Features) -> (Context<Stub>, Log) {
  context(Stub::new(features))
}

/// Build a context over a stub simulating the mask plane of a `width` x `height` framebuffer.
pub fn context_with_mask_plane(width: u32, height: u32) -> (Context<Stub>, Log) {
  let mut stub = Stub::new(Features::STENCIL_MASK);
  stub.mask = Some(MaskPlane::new(width, height));

  context(stub)
}

unsafe impl FeaturesBackend for Stub {
  fn backend_name(&self) -> &'static str {
    "stub"
  }

  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error> {
    Ok(self.capabilities)
  }
}

unsafe impl Pixel for Stub {
  fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
    let code = FORMATS.iter().position(|f| *f == format)? as u32;
    Some(NativeFormat::new(code, code, 0))
  }

  fn pixel_format_from_internal(&self, internal: u32) -> Option<PixelFormat> {
    FORMATS.get(internal as usize).copied()
  }
}

unsafe impl Sampler for Stub {
  type SamplerRepr = u32;

  unsafe fn create_sampler(&mut self, state: &SamplerState) -> u32 {
    self.log.push(Call::CreateSampler(*state));
    self.next += 1;
    self.next
  }

  unsafe fn destroy_sampler(&mut self, sampler: u32) {
    self.log.push(Call::DestroySampler(sampler));
  }

  unsafe fn bind_sampler(&mut self, unit: u32, sampler: u32) {
    self.log.push(Call::BindSampler(unit, sampler));
  }
}

unsafe impl Texture for Stub {
  type TextureRepr = u32;

  unsafe fn gen_texture(&mut self, target: TextureTarget) -> u32 {
    self.next += 1;
    self.log.push(Call::GenTexture(target, self.next));
    self.next
  }

  unsafe fn delete_texture(&mut self, _: TextureTarget, texture: u32) {
    self.log.push(Call::DeleteTexture(texture));
  }

  unsafe fn size_supported(&mut self, _: TextureTarget, _: &NativeFormat, size: [u32; 3]) -> bool {
    self.log.push(Call::SizeSupported(size));
    size.iter().all(|&n| n <= self.max_size)
  }

  unsafe fn texture_storage(
    &mut self,
    _: TextureTarget,
    texture: u32,
    _: &NativeFormat,
    size: [u32; 3],
  ) -> Result<(), Error> {
    self.log.push(Call::TextureStorage(texture, size));

    if self.out_of_memory {
      Err(Error::resource_exhausted(ErrorDomain::Driver, "out of memory"))
    } else {
      Ok(())
    }
  }

  unsafe fn texture_upload(
    &mut self,
    _: TextureTarget,
    texture: u32,
    _: &NativeFormat,
    _: &NativeFormat,
    _: &Bitmap,
    size: [u32; 3],
  ) -> Result<(), Error> {
    self.log.push(Call::TextureUpload(texture, size));

    if self.out_of_memory {
      Err(Error::resource_exhausted(ErrorDomain::Driver, "out of memory"))
    } else {
      Ok(())
    }
  }

  unsafe fn bind_foreign(&mut self, _: TextureTarget, texture: u32) -> Result<(), Error> {
    self.log.push(Call::BindForeign(texture));

    if self.reject_foreign {
      Err(Error::unsupported(ErrorDomain::System, "cannot bind"))
    } else {
      Ok(())
    }
  }

  unsafe fn query_texture_parameters(&mut self, _: TextureTarget, texture: u32) -> ForeignInfo {
    self.log.push(Call::QueryTextureParameters(texture));
    self.foreign_info
  }

  unsafe fn set_texture_filters(
    &mut self,
    _: TextureTarget,
    texture: u32,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) {
    self
      .log
      .push(Call::SetFilters(texture, min_filter, mag_filter));
  }

  unsafe fn set_texture_wrap_modes(
    &mut self,
    _: TextureTarget,
    texture: u32,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    wrap_r: Option<WrapMode>,
  ) {
    self
      .log
      .push(Call::SetWrapModes(texture, wrap_s, wrap_t, wrap_r));
  }

  unsafe fn generate_mipmap(&mut self, _: TextureTarget, texture: u32) {
    self.log.push(Call::GenerateMipmap(texture));
  }

  unsafe fn legacy_generate_mipmap(
    &mut self,
    _: TextureTarget,
    texture: u32,
    first_pixel: &FirstPixel,
  ) {
    self.log.push(Call::LegacyGenerateMipmap(
      texture,
      first_pixel.bytes().to_vec(),
    ));
  }

  unsafe fn bind_texture(&mut self, unit: u32, _: TextureTarget, texture: u32) {
    self.log.push(Call::BindTexture(unit, texture));
  }
}

unsafe impl Clip for Stub {
  unsafe fn set_scissor(&mut self, region: Option<ScissorRegion>) {
    self.log.push(Call::Scissor(region));

    if let Some(ref mut mask) = self.mask {
      mask.scissor = region;
    }
  }

  unsafe fn set_mask_enabled(&mut self, enabled: bool) {
    self.log.push(Call::MaskEnabled(enabled));

    if let Some(ref mut mask) = self.mask {
      mask.enabled = enabled;
    }
  }

  unsafe fn clear_mask(&mut self, value: u8) {
    self.log.push(Call::ClearMask(value));

    if let Some(ref mut mask) = self.mask {
      mask.clear(value);
    }
  }

  unsafe fn set_mask_func(&mut self, comparison: Comparison, reference: u8, mask_bits: u8) {
    self.log.push(Call::MaskFunc(comparison, reference, mask_bits));

    if let Some(ref mut mask) = self.mask {
      mask.func = (comparison, reference, mask_bits);
    }
  }

  unsafe fn set_mask_op(&mut self, op: StencilOp) {
    self.log.push(Call::MaskOp(op));

    if let Some(ref mut mask) = self.mask {
      mask.op = op;
    }
  }

  unsafe fn set_mask_write_mask(&mut self, write_mask: u8) {
    self.log.push(Call::MaskWriteMask(write_mask));

    if let Some(ref mut mask) = self.mask {
      mask.write_mask = write_mask;
    }
  }

  unsafe fn set_color_depth_writes(&mut self, enabled: bool) {
    self.log.push(Call::ColorDepthWrites(enabled));
  }

  unsafe fn draw_mask_rectangle(&mut self, rect: [f32; 4], transform: &Matrix4<f32>) {
    self.log.push(Call::DrawRectangle(rect));

    let [x0, y0, x1, y1] = rect;
    let vertices = [[x0, y0], [x1, y0], [x0, y1], [x1, y1]]
      .iter()
      .map(|v| to_clip(transform, *v))
      .collect();
    self.draw_mask(vertices, Topology::TriangleStrip);
  }

  unsafe fn draw_mask_silhouette(&mut self, silhouette: &Silhouette, transform: &Matrix4<f32>) {
    self
      .log
      .push(Call::DrawSilhouette(silhouette.vertices().len()));

    let vertices = silhouette
      .vertices()
      .iter()
      .map(|v| to_clip(transform, *v))
      .collect();
    self.draw_mask(vertices, silhouette.topology());
  }
}
