//! Error types for interpretation.

use snafu::Snafu;
use tmir_ir::{OpName, ValueId};

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while interpreting a function.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Wrong number of arguments passed to a function.
    #[snafu(display("@{func} expects {expected} argument(s), got {actual}"))]
    ArgumentCount { func: String, expected: usize, actual: usize },

    /// A value was read before anything produced it.
    #[snafu(display("value {value} has not been computed"))]
    UnboundValue { value: ValueId },

    /// The interpreter has no semantics for this operation.
    #[snafu(display("unsupported operation '{op}'"))]
    UnsupportedOp { op: OpName },

    /// An operation has fewer operands than its semantics need.
    #[snafu(display("'{op}' expects at least {expected} operand(s), got {actual}"))]
    OperandCount { op: OpName, expected: usize, actual: usize },

    /// An operand had the wrong kind (array vs. index vs. scalar).
    #[snafu(display("'{op}' expects {expected} for operand {value}"))]
    OperandKind { op: OpName, value: ValueId, expected: &'static str },

    /// Shapes that must agree do not.
    #[snafu(display("'{op}' shape mismatch: expected {expected:?}, got {actual:?}"))]
    ShapeMismatch { op: OpName, expected: Vec<usize>, actual: Vec<usize> },

    /// Storage length does not match the requested shape.
    #[snafu(display("{len} element(s) cannot fill shape {shape:?}"))]
    StorageSize { shape: Vec<usize>, len: usize },

    /// An index or dimension is out of range.
    #[snafu(display("'{op}' index {index} out of bounds for extent {extent}"))]
    IndexOutOfBounds { op: OpName, index: usize, extent: usize },

    /// A required attribute is missing or malformed.
    #[snafu(display("'{op}' is missing attribute '{name}'"))]
    MissingAttribute { op: OpName, name: &'static str },
}
