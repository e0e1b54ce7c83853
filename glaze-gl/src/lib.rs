//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for
//! [glaze](https://crates.io/crates/glaze). Both backends share the same driver and only differ in
//! the GL dialect they speak:
//!
//! - [`GL33`], for desktop OpenGL. Core 3.3 contexts get everything; older compatibility
//!   contexts (down to 2.0) are supported with fewer features.
//! - [`GLES2`], for OpenGL ES 2.0 and 3.x.
//!
//! The GL function pointers must be loaded with [`gl::load_with`] and a context must be current
//! on the calling thread before creating a backend.

pub mod driver;

pub use driver::{Desktop, Embedded, Flavor, GLState, Gl, GlVersion, StateQueryError, GL33, GLES2};
