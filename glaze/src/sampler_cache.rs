//! Sampler state cache.
//!
//! Creating native sampler objects is expensive, and most of the time the same few filter / wrap
//! combinations are requested over and over. The cache interns sampler states in two tables:
//!
//! - the *logical* table holds one entry per distinct requested state, including automatic wrap
//!   modes;
//! - the *native* table holds one entry per distinct native state, with automatic wrap modes
//!   resolved. Only native entries own a native sampler object.
//!
//! Several logical entries might then share the same native sampler object. Entries are handed
//! out as [`SamplerRef`]s; two requests for the same state always yield the very same entry, which
//! can be checked with [`Rc::ptr_eq`].

use log::{debug, trace};
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::sampler::Sampler as SamplerBackend;
use crate::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use crate::util::OneAtATimeBuildHasher;

/// An interned sampler state.
#[derive(Debug, Eq, PartialEq)]
pub struct SamplerEntry<S> {
  state: SamplerState,
  native: Option<S>,
}

impl<S> SamplerEntry<S>
where
  S: Copy,
{
  pub fn state(&self) -> &SamplerState {
    &self.state
  }

  pub fn min_filter(&self) -> MinFilter {
    self.state.min_filter
  }

  pub fn mag_filter(&self) -> MagFilter {
    self.state.mag_filter
  }

  pub fn wrap_s(&self) -> WrapMode {
    self.state.wrap_s
  }

  pub fn wrap_t(&self) -> WrapMode {
    self.state.wrap_t
  }

  pub fn wrap_r(&self) -> WrapMode {
    self.state.wrap_r
  }

  /// Native sampler object realizing this state, if the backend has sampler objects.
  pub fn native(&self) -> Option<S> {
    self.native
  }
}

/// Shared handle to a cached entry.
pub type SamplerRef<S> = Rc<SamplerEntry<S>>;

type Table<S> = HashMap<SamplerState, SamplerRef<S>, OneAtATimeBuildHasher>;

/// Two-level sampler cache.
#[derive(Debug)]
pub struct SamplerCache<B>
where
  B: ?Sized + SamplerBackend,
{
  logical: Table<B::SamplerRepr>,
  native: Table<B::SamplerRepr>,
  sampler_objects: bool,
}

impl<B> SamplerCache<B>
where
  B: ?Sized + SamplerBackend,
{
  /// Create an empty cache.
  ///
  /// Native sampler objects are only created when `sampler_objects` is set.
  pub fn new(sampler_objects: bool) -> Self {
    SamplerCache {
      logical: HashMap::default(),
      native: HashMap::default(),
      sampler_objects,
    }
  }

  /// Number of distinct requested states.
  pub fn logical_len(&self) -> usize {
    self.logical.len()
  }

  /// Number of distinct native states.
  pub fn native_len(&self) -> usize {
    self.native.len()
  }

  /// Get the entry for a requested state, creating it on first request.
  pub fn get(&mut self, backend: &mut B, state: &SamplerState) -> SamplerRef<B::SamplerRepr> {
    if let Some(entry) = self.logical.get(state) {
      return entry.clone();
    }

    let native = self.get_native(backend, &state.canonical());
    let entry = Rc::new(SamplerEntry {
      state: *state,
      native: native.native,
    });

    trace!("new logical sampler entry {:?}", state);
    self.logical.insert(*state, entry.clone());

    entry
  }

  fn get_native(&mut self, backend: &mut B, state: &SamplerState) -> SamplerRef<B::SamplerRepr> {
    if let Some(entry) = self.native.get(state) {
      return entry.clone();
    }

    let native = if self.sampler_objects {
      debug!("creating sampler object for {:?}", state);
      Some(unsafe { backend.create_sampler(state) })
    } else {
      None
    };

    let entry = Rc::new(SamplerEntry {
      state: *state,
      native,
    });
    self.native.insert(*state, entry.clone());

    entry
  }

  /// Entry for the default state (linear filters, automatic wrap modes).
  pub fn default_entry(&mut self, backend: &mut B) -> SamplerRef<B::SamplerRepr> {
    self.get(backend, &SamplerState::DEFAULT)
  }

  /// Entry with the filters of `old` and new wrap modes.
  pub fn update_wrap_modes(
    &mut self,
    backend: &mut B,
    old: &SamplerEntry<B::SamplerRepr>,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    wrap_r: WrapMode,
  ) -> SamplerRef<B::SamplerRepr> {
    let state = SamplerState {
      wrap_s,
      wrap_t,
      wrap_r,
      ..old.state
    };

    self.get(backend, &state)
  }

  /// Entry with the wrap modes of `old` and new filters.
  pub fn update_filters(
    &mut self,
    backend: &mut B,
    old: &SamplerEntry<B::SamplerRepr>,
    min_filter: MinFilter,
    mag_filter: MagFilter,
  ) -> SamplerRef<B::SamplerRepr> {
    let state = SamplerState {
      min_filter,
      mag_filter,
      ..old.state
    };

    self.get(backend, &state)
  }

  /// Destroy every native sampler object and forget every entry.
  ///
  /// Native entries are visited before logical ones, so each native object is destroyed exactly
  /// once. Outstanding [`SamplerRef`]s stay readable but their native handles are dangling.
  pub fn clear(&mut self, backend: &mut B) {
    for (_, entry) in self.native.drain() {
      if let Some(sampler) = entry.native {
        unsafe { backend.destroy_sampler(sampler) };
      }
    }

    self.logical.clear();
  }
}
