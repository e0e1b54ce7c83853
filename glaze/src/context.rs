//! Graphics context.
//!
//! The [`Context`] owns the backend and everything cached on top of it: the detected features,
//! the sampler cache and the clip state realizer. Every operation reaching native code goes
//! through it, or through resources it created.
//!
//! A context is neither [`Send`] nor [`Sync`]: native graphics state is bound to a thread.

use log::info;
use std::cell::{Ref, RefCell, RefMut};
use std::marker::PhantomData;
use std::rc::Rc;

use crate::backend::Backend;
use crate::bitmap::Bitmap;
use crate::clip::{ClipStack, ClipStackArena};
use crate::config::Config;
use crate::error::Error;
use crate::features::{Capabilities, Features, Limits};
use crate::framebuffer::Framebuffer;
use crate::pixel::PixelFormat;
use crate::realizer::ClipStackRealizer;
use crate::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use crate::sampler_cache::{SamplerCache, SamplerEntry, SamplerRef};
use crate::texture::{Texture, TextureLoader, TextureShape};

/// Shared environment of a backend.
pub struct Context<B>
where
  B: Backend,
{
  _a: PhantomData<*const ()>, // !Send and !Sync
  backend: Rc<RefCell<B>>,
  capabilities: Capabilities,
  config: Config,
  sampler_cache: SamplerCache<B>,
  realizer: ClipStackRealizer,
}

impl<B> Context<B>
where
  B: Backend,
{
  /// Create a context, detecting the features of the backend.
  pub fn new(mut backend: B, config: Config) -> Result<Self, Error> {
    let mut capabilities = unsafe { backend.detect_capabilities()? };
    capabilities.features = config.apply(capabilities.features);

    info!(
      "{} backend: features {:?}, limits {:?}",
      backend.backend_name(),
      capabilities.features,
      capabilities.limits
    );

    let sampler_objects = capabilities.has_feature(Features::SAMPLER_OBJECTS);

    Ok(Context {
      _a: PhantomData,
      backend: Rc::new(RefCell::new(backend)),
      capabilities,
      config,
      sampler_cache: SamplerCache::new(sampler_objects),
      realizer: ClipStackRealizer::new(),
    })
  }

  /// Borrow the backend.
  pub fn backend(&self) -> Ref<B> {
    self.backend.borrow()
  }

  /// Mutably borrow the backend.
  ///
  /// Changing the scissor or the mask plane behind the context's back requires calling
  /// [`Context::invalidate_clip_state`] afterwards.
  pub fn backend_mut(&self) -> RefMut<B> {
    self.backend.borrow_mut()
  }

  pub fn capabilities(&self) -> &Capabilities {
    &self.capabilities
  }

  pub fn features(&self) -> Features {
    self.capabilities.features
  }

  /// Check whether a feature is available; never reaches the backend.
  pub fn has_feature(&self, feature: Features) -> bool {
    self.capabilities.has_feature(feature)
  }

  pub fn limits(&self) -> &Limits {
    &self.capabilities.limits
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn sampler_cache(&self) -> &SamplerCache<B> {
    &self.sampler_cache
  }

  /// Sampler entry for linear filters and automatic wrap modes.
  pub fn default_sampler(&mut self) -> SamplerRef<B::SamplerRepr> {
    self
      .sampler_cache
      .default_entry(&mut *self.backend.borrow_mut())
  }

  /// Sampler entry for an arbitrary state.
  pub fn sampler(&mut self, state: &SamplerState) -> SamplerRef<B::SamplerRepr> {
    self.sampler_cache.get(&mut *self.backend.borrow_mut(), state)
  }

  /// Sampler entry with the filters of `old` and new wrap modes.
  pub fn update_sampler_wrap_modes(
    &mut self,
    old: &SamplerEntry<B::SamplerRepr>,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    wrap_r: WrapMode,
  ) -> SamplerRef<B::SamplerRepr> {
    self.sampler_cache.update_wrap_modes(
      &mut *self.backend.borrow_mut(),
      old,
      wrap_s,
      wrap_t,
      wrap_r,
    )
  }

  /// Sampler entry with the wrap modes of `old` and new filters.
  pub fn update_sampler_filters(
    &mut self,
    old: &SamplerEntry<B::SamplerRepr>,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> SamplerRef<B::SamplerRepr> {
    self.sampler_cache.update_filters(
      &mut *self.backend.borrow_mut(),
      old,
      min_filter,
      mag_filter,
    )
  }

  /// Bind a texture to a unit and make it sample with a sampler entry.
  ///
  /// With sampler objects, the entry's native sampler is bound to the unit. Otherwise the
  /// filters and wrap modes are set on the texture itself, skipping what is already set.
  ///
  /// # Panics
  ///
  /// Panics if the texture isn't allocated or can't be sampled with the entry's state.
  pub fn flush_sampler<S>(
    &mut self,
    unit: u32,
    texture: &mut Texture<B, S>,
    entry: &SamplerEntry<B::SamplerRepr>,
  ) where
    S: TextureShape,
  {
    texture.check_sampler_state(entry.state());
    texture.bind(&mut self.backend.borrow_mut(), unit);

    if self.has_feature(Features::SAMPLER_OBJECTS) {
      if let Some(sampler) = entry.native() {
        unsafe { self.backend.borrow_mut().bind_sampler(unit, sampler) };
      }
    } else {
      texture.flush_filters(entry.min_filter(), entry.mag_filter());
      texture.flush_wrap_modes(entry.wrap_s(), entry.wrap_t(), entry.wrap_r());
    }
  }

  /// Realize a clip stack for a framebuffer, unless it's already realized.
  pub fn flush_clip_stack(&mut self, arena: &ClipStackArena, stack: ClipStack, framebuffer: &Framebuffer) {
    self.realizer.flush(
      &mut *self.backend.borrow_mut(),
      self.capabilities.features,
      arena,
      stack,
      framebuffer,
    );
  }

  /// Forget the realized clip state, forcing the next flush to reach the backend.
  pub fn invalidate_clip_state(&mut self) {
    self.realizer.invalidate();
  }

  /// Create a texture from a loader. Nothing reaches the backend before the texture gets
  /// allocated.
  pub fn new_texture<S>(
    &self,
    loader: TextureLoader<S, B::TextureRepr>,
    format: PixelFormat,
  ) -> Texture<B, S>
  where
    S: TextureShape,
  {
    Texture::new(self.backend.clone(), self.capabilities, loader, format)
  }

  /// Create a texture with uninitialized storage.
  pub fn new_texture_with_size<S>(&self, size: S::Size, format: PixelFormat) -> Texture<B, S>
  where
    S: TextureShape,
  {
    self.new_texture(TextureLoader::Sized(size), format)
  }

  /// Create a texture filled with a bitmap.
  pub fn new_texture_from_bitmap<S>(
    &self,
    bitmap: Bitmap,
    size: S::Size,
    format: PixelFormat,
  ) -> Texture<B, S>
  where
    S: TextureShape,
  {
    self.new_texture(TextureLoader::Bitmap { bitmap, size }, format)
  }

  /// Wrap a texture created outside of the library.
  ///
  /// The handle is never deleted by the library. When the backend can query texture parameters,
  /// the queried format wins over `format`.
  pub fn new_texture_from_foreign<S>(
    &self,
    handle: B::TextureRepr,
    size: S::Size,
    format: PixelFormat,
  ) -> Texture<B, S>
  where
    S: TextureShape,
  {
    self.new_texture(
      TextureLoader::Foreign {
        handle,
        size,
        format,
      },
      format,
    )
  }
}

impl<B> Drop for Context<B>
where
  B: Backend,
{
  fn drop(&mut self) {
    self.sampler_cache.clear(&mut *self.backend.borrow_mut());
  }
}
