//! Host IR for tensor-algebra programs.
//!
//! The crate provides the data structures passes operate on and the
//! machinery to rewrite them.
//!
//! # Module Organization
//!
//! - [`types`] - Tensor, memref and scalar value types
//! - [`graph`] - Arena-backed single-block operation graph
//! - [`builder`] - Insertion-point aware operation builder
//! - [`func`] - Functions wrapping a graph
//! - [`dialect`] - Operation names, attributes and builders per dialect
//! - [`interfaces`] - Capability contracts shared by many operation kinds
//! - [`conversion`] - Type converter, conversion target and partial-conversion driver
//! - [`diagnostic`] - Errors reported against operations
//! - [`printer`] / [`verifier`] - Textual form and structural checks
//! - [`error`] - Error types and result handling

pub mod attribute;
pub mod builder;
pub mod conversion;
pub mod diagnostic;
pub mod dialect;
pub mod error;
pub mod func;
pub mod graph;
pub mod interfaces;
pub mod location;
pub mod printer;
pub mod types;
pub mod verifier;


pub use attribute::{Attribute, Attributes};
pub use builder::OpBuilder;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, MaterializationKind, Result};
pub use func::Func;
pub use graph::{Checkpoint, Graph, InsertPoint, OpId, OpName, Operation, OperationState, ValueDef, ValueId};
pub use interfaces::{InterfaceRegistry, TensorAlgebraOp};
pub use location::Location;
pub use types::{Dim, RankedType, Shape, Type};
pub use verifier::verify;

pub use tmir_dtype::DType;
