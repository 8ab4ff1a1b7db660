//! Tensor-to-buffer conversion for destination-style tensor-algebra ops.
//!
//! Tensor-algebra ops (`tm_tensor.scan`, `tm_tensor.sort`, ...) take
//! `ins(...)` and `outs(...)` operands and, on tensors, return one result per
//! output. [`BufferizePass`] rewrites every such op to write into buffers
//! instead:
//!
//! ```text
//! %r = "tm_tensor.scan"(%in, %out, %acc) : (tensor<..>, tensor<..>, tensor<..>) -> (tensor<..>, tensor<..>)
//! ```
//!
//! becomes allocations (copies for outputs the op reads), a result-less op
//! over buffers, and `to_tensor` views wherever a tensor is still expected.
//!
//! # Module Organization
//!
//! - [`type_converter`] - Tensor to buffer type table and materializations
//! - [`cast`] - Buffer cast-or-realloc
//! - [`allocation`] - Output buffer allocation
//! - [`pattern`] - The generic rewrite rule
//! - [`pass`] - Legality policy and pass entry point
//! - [`config`] - Pass configuration

pub mod allocation;
pub mod cast;
pub mod config;
pub mod error;
pub mod pass;
pub mod pattern;
pub mod type_converter;


pub use config::BufferizeConfig;
pub use error::{Error, Result};
pub use pass::{BufferizePass, PassStats};
pub use pattern::BufferizeTensorAlgebraOp;
pub use type_converter::bufferize_type_converter;
