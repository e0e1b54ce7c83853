//! Feature detection backend interface.

use crate::error::Error;
use crate::features::Capabilities;

/// Feature detection.
pub unsafe trait Features {
  /// Short name of the backend, used in logs.
  fn backend_name(&self) -> &'static str;

  /// Detect the features and limits of the backend.
  ///
  /// Called exactly once, when the [`Context`](crate::context::Context) is created.
  unsafe fn detect_capabilities(&mut self) -> Result<Capabilities, Error>;
}
