//! Operation names and typed builders, grouped by dialect.
//!
//! - [`arith`] - constants
//! - [`func`] - function terminator
//! - [`tensor`] - value-semantic tensor helpers
//! - [`memref`] - buffer allocation, copies, casts and shape queries
//! - [`bufferization`] - tensor/buffer boundary views
//! - [`tm_tensor`] - the tensor-algebra family the bufferization pass targets

pub mod arith;
pub mod bufferization;
pub mod func;
pub mod memref;
pub mod tensor;
pub mod tm_tensor;
