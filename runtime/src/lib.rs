//! Reference interpreter for tmir functions.
//!
//! Executes both value-semantic functions (tensor operands, results tied to
//! outputs) and their bufferized form (buffer operands written in place) on
//! host memory, so the two can be compared value by value.
//!
//! - [`buffer`] - Shared host storage
//! - [`kernels`] - Reference kernels of the tensor-algebra ops
//! - [`interpreter`] - Op-by-op evaluation of a [`tmir_ir::Func`]

pub mod buffer;
pub mod error;
pub mod interpreter;
pub mod kernels;


pub use buffer::{Array, Extents, Lanes};
pub use error::{Error, Result};
pub use interpreter::{Value, array, execute};
