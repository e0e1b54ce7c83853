use gl::types::*;

use glaze::stencil::{Comparison, StencilOp};

pub(crate) fn comparison_to_glenum(dc: Comparison) -> GLenum {
  match dc {
    Comparison::Never => gl::NEVER,
    Comparison::Equal => gl::EQUAL,
    Comparison::LessOrEqual => gl::LEQUAL,
  }
}

pub(crate) fn stencil_op_to_glenum(op: StencilOp) -> GLenum {
  match op {
    StencilOp::Keep => gl::KEEP,
    StencilOp::Replace => gl::REPLACE,
    StencilOp::Increment => gl::INCR,
    StencilOp::Decrement => gl::DECR,
    StencilOp::Invert => gl::INVERT,
  }
}
