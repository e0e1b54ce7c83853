mod common;

use common::{context_with, Call};
use glaze::features::Features;
use glaze::sampler::{MagFilter, MinFilter, SamplerState, WrapMode};
use glaze::texture::Dim2;
use glaze::pixel::PixelFormat;
use std::rc::Rc;

fn state(wrap: WrapMode) -> SamplerState {
  SamplerState {
    wrap_s: wrap,
    wrap_t: wrap,
    wrap_r: wrap,
    ..SamplerState::DEFAULT
  }
}

#[test]
fn default_sampler_is_always_the_same_entry() {
  let (mut ctx, log) = context_with(Features::SAMPLER_OBJECTS);

  let a = ctx.default_sampler();
  let b = ctx.default_sampler();
  let c = ctx.sampler(&SamplerState::DEFAULT);

  assert!(Rc::ptr_eq(&a, &b));
  assert!(Rc::ptr_eq(&a, &c));
  assert_eq!(log.count(|c| matches!(c, Call::CreateSampler(_))), 1);
}

#[test]
fn automatic_and_clamp_share_one_native_object() {
  let (mut ctx, log) = context_with(Features::SAMPLER_OBJECTS);

  let automatic = ctx.sampler(&state(WrapMode::Automatic));
  let clamp = ctx.sampler(&state(WrapMode::ClampToEdge));

  assert!(!Rc::ptr_eq(&automatic, &clamp));
  assert_eq!(automatic.native(), clamp.native());
  assert_eq!(ctx.sampler_cache().logical_len(), 2);
  assert_eq!(ctx.sampler_cache().native_len(), 1);

  // the native object is created for the resolved state
  assert_eq!(
    log.calls(),
    vec![Call::CreateSampler(state(WrapMode::ClampToEdge))]
  );

  drop(automatic);
  drop(clamp);
  drop(ctx);

  let destroyed = log.count(|c| matches!(c, Call::DestroySampler(_)));
  assert_eq!(destroyed, 1);
}

#[test]
fn every_native_object_is_destroyed_once_at_teardown() {
  let (mut ctx, log) = context_with(Features::SAMPLER_OBJECTS);

  let wraps = [
    WrapMode::Automatic,
    WrapMode::ClampToEdge,
    WrapMode::Repeat,
    WrapMode::MirroredRepeat,
  ];

  for wrap in wraps {
    for min_filter in [MinFilter::Nearest, MinFilter::Linear, MinFilter::LinearMipmapLinear] {
      let s = SamplerState {
        min_filter,
        ..state(wrap)
      };
      ctx.sampler(&s);
      ctx.sampler(&s);
    }
  }

  // automatic and clamp collapse together
  assert_eq!(ctx.sampler_cache().logical_len(), 12);
  assert_eq!(ctx.sampler_cache().native_len(), 9);
  assert_eq!(log.count(|c| matches!(c, Call::CreateSampler(_))), 9);

  drop(ctx);

  let mut destroyed: Vec<u32> = log
    .calls()
    .into_iter()
    .filter_map(|c| match c {
      Call::DestroySampler(s) => Some(s),
      _ => None,
    })
    .collect();
  destroyed.sort_unstable();

  assert_eq!(destroyed, (1..=9).collect::<Vec<_>>());
}

#[test]
fn updating_an_entry_keeps_the_other_half() {
  let (mut ctx, _) = context_with(Features::SAMPLER_OBJECTS);

  let default = ctx.default_sampler();
  let nearest = ctx.update_sampler_filters(&default, MinFilter::Nearest, MagFilter::Nearest);

  assert_eq!(nearest.wrap_s(), WrapMode::Automatic);
  assert_eq!(nearest.min_filter(), MinFilter::Nearest);

  let repeat = ctx.update_sampler_wrap_modes(
    &nearest,
    WrapMode::Repeat,
    WrapMode::Repeat,
    WrapMode::Repeat,
  );

  assert_eq!(repeat.mag_filter(), MagFilter::Nearest);
  assert_eq!(repeat.wrap_t(), WrapMode::Repeat);

  // updating to the same state is a lookup
  let same = ctx.update_sampler_filters(&repeat, MinFilter::Nearest, MagFilter::Nearest);
  assert!(Rc::ptr_eq(&same, &repeat));
}

#[test]
fn no_native_objects_without_sampler_objects() {
  let (mut ctx, log) = context_with(Features::TEXTURE_NPOT);

  let entry = ctx.sampler(&state(WrapMode::Repeat));

  assert_eq!(entry.native(), None);
  assert_eq!(ctx.sampler_cache().native_len(), 1);
  assert!(log.calls().is_empty());

  drop(entry);
  drop(ctx);

  assert!(log.calls().is_empty());
}

#[test]
fn flushing_with_sampler_objects_binds_the_native_object() {
  let (mut ctx, log) = context_with(Features::SAMPLER_OBJECTS | Features::TEXTURE_NPOT);

  let mut texture = ctx.new_texture_with_size::<Dim2>([16, 16], PixelFormat::Rgba8888);
  texture.allocate().unwrap();
  let handle = texture.native_handle().unwrap();

  let entry = ctx.sampler(&state(WrapMode::Repeat));
  let sampler = entry.native().unwrap();
  log.take();

  ctx.flush_sampler(2, &mut texture, &entry);

  assert_eq!(
    log.take(),
    vec![Call::BindTexture(2, handle), Call::BindSampler(2, sampler)]
  );
}

#[test]
fn flushing_without_sampler_objects_sets_texture_state_once() {
  let (mut ctx, log) = context_with(Features::TEXTURE_NPOT);

  let mut texture = ctx.new_texture_with_size::<Dim2>([16, 16], PixelFormat::Rgba8888);
  texture.allocate().unwrap();
  let handle = texture.native_handle().unwrap();

  let entry = ctx.sampler(&SamplerState {
    min_filter: MinFilter::Nearest,
    ..state(WrapMode::Automatic)
  });
  log.take();

  ctx.flush_sampler(0, &mut texture, &entry);

  assert_eq!(
    log.take(),
    vec![
      Call::BindTexture(0, handle),
      Call::SetFilters(handle, MinFilter::Nearest, MagFilter::Linear),
      Call::SetWrapModes(handle, WrapMode::ClampToEdge, WrapMode::ClampToEdge, None),
    ]
  );

  // an explicit clamp is the same native state
  let clamp = ctx.sampler(&SamplerState {
    min_filter: MinFilter::Nearest,
    ..state(WrapMode::ClampToEdge)
  });
  ctx.flush_sampler(0, &mut texture, &clamp);

  assert_eq!(log.take(), vec![Call::BindTexture(0, handle)]);
}
