//! # GPU resource caching and backend dispatch
//!
//! glaze sits between a retained-mode drawing layer and a native graphics stack. It doesn't
//! draw anything by itself; instead, it makes sure the few native objects and state changes a
//! drawing layer needs are created and issued as rarely as possible:
//!
//! - **Backends**: every native graphics stack (desktop and embedded OpenGL, explicit APIs,
//!   kernel mode-setting, or nothing at all) implements the traits of the [`backend`] module.
//!   Nothing else in the crate reaches native code.
//! - **Sampler cache**: filter and wrap-mode combinations are interned, so that at most one native
//!   sampler object exists per distinct native state. See [`sampler_cache`].
//! - **Textures**: 2D, 3D and rectangle textures, allocated lazily from a size, from decoded
//!   pixels or by adopting a foreign native handle. Filter and wrap changes are only issued when
//!   they actually change something. See [`texture`].
//! - **Clipping**: arbitrarily deep stacks of nested clip shapes are realized with a scissor and,
//!   when needed, an auxiliary mask plane. See [`clip`] and [`realizer`].
//!
//! Everything is tied together by a [`Context`](context::Context), which owns a backend and the
//! caches built on top of it.
//!
//! # Backends
//!
//! This crate only ships the [`Nop`](nop::Nop) backend. Real backends live in their own crates:
//!
//! - [glaze-gl], for OpenGL 3.3 and OpenGL ES 2.0 / 3.0.
//! - [glaze-wgpu], over [wgpu](https://crates.io/crates/wgpu).
//! - [glaze-kms], for host-mapped dumb buffers of the kernel mode-setting API.
//!
//! [glaze-gl]: https://crates.io/crates/glaze-gl
//! [glaze-wgpu]: https://crates.io/crates/glaze-wgpu
//! [glaze-kms]: https://crates.io/crates/glaze-kms

pub mod backend;
pub mod bitmap;
pub mod clip;
pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod framebuffer;
pub mod nop;
pub mod pixel;
pub mod realizer;
pub mod sampler;
pub mod sampler_cache;
pub mod scissor;
pub mod silhouette;
pub mod stencil;
pub mod texture;
pub mod util;

pub use crate::error::{Error, ErrorDomain, ErrorKind};
