//! Mask plane tests and operations.
//!
//! Only the tests and operations clip stack realization uses are exposed.

/// Comparison performed by the mask test. `a` is the reference value and `b` the value already
/// stored in the mask, both masked.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Comparison {
  /// Test never succeeds.
  Never,
  /// Test succeeds if `a == b`.
  Equal,
  /// Test succeeds if `a <= b`.
  LessOrEqual,
}

/// Possible mask operations.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum StencilOp {
  /// Keep the current value.
  Keep,

  /// Replace the value with the reference value.
  Replace,

  /// Increment the value, clamping at the maximum.
  Increment,

  /// Decrement the value, clamping at `0`.
  Decrement,

  /// Bit-wise inversion.
  Invert,
}
