//! Errors reported by fallible operations.
//!
//! Every fallible operation of the crate (texture allocation, feature detection, foreign texture
//! adoption, …) reports an [`Error`], which carries a coarse [`ErrorDomain`], an [`ErrorKind`]
//! that callers can match on and a human-readable message.

use std::error;
use std::fmt;

/// Subsystem an error originates from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorDomain {
  /// General system or context error (feature detection, foreign objects, …).
  System,
  /// Texture creation, allocation and upload.
  Texture,
  /// Native driver failure.
  Driver,
}

impl fmt::Display for ErrorDomain {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ErrorDomain::System => f.write_str("system"),
      ErrorDomain::Texture => f.write_str("texture"),
      ErrorDomain::Driver => f.write_str("driver"),
    }
  }
}

/// What went wrong.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
  /// The requested feature, size or format is not available on the backend.
  Unsupported,
  /// The backend ran out of memory while creating a resource.
  ResourceExhausted,
  /// A foreign object handed to the library is not usable.
  InvalidForeignObject,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ErrorKind::Unsupported => f.write_str("unsupported"),
      ErrorKind::ResourceExhausted => f.write_str("resource exhausted"),
      ErrorKind::InvalidForeignObject => f.write_str("invalid foreign object"),
    }
  }
}

/// Structured error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
  domain: ErrorDomain,
  kind: ErrorKind,
  message: String,
}

impl Error {
  /// Create a new error.
  pub fn new(domain: ErrorDomain, kind: ErrorKind, message: impl Into<String>) -> Self {
    Error {
      domain,
      kind,
      message: message.into(),
    }
  }

  /// Something is not supported by the current backend.
  pub fn unsupported(domain: ErrorDomain, message: impl Into<String>) -> Self {
    Self::new(domain, ErrorKind::Unsupported, message)
  }

  /// A native resource could not be created because the backend is out of memory.
  pub fn resource_exhausted(domain: ErrorDomain, message: impl Into<String>) -> Self {
    Self::new(domain, ErrorKind::ResourceExhausted, message)
  }

  /// A foreign object cannot be adopted.
  pub fn invalid_foreign_object(message: impl Into<String>) -> Self {
    Self::new(ErrorDomain::System, ErrorKind::InvalidForeignObject, message)
  }

  /// Domain the error belongs to.
  pub fn domain(&self) -> ErrorDomain {
    self.domain
  }

  /// Kind of the error.
  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  /// Human-readable description.
  pub fn message(&self) -> &str {
    &self.message
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} error ({}): {}", self.domain, self.kind, self.message)
  }
}

impl error::Error for Error {}
