//! Errors raised while building, checking and converting IR.

use snafu::Snafu;

use crate::diagnostic::Diagnostics;
use crate::graph::{OpName, ValueId};
use crate::types::Type;

/// Result type for IR operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which side of a type mismatch a materialization bridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MaterializationKind {
    /// Converted value back to the original type (buffer to tensor).
    Source,
    /// Original value to the converted type (tensor to buffer).
    Target,
}

/// Errors from graph edits, type parsing, verification and the conversion driver.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Textual type could not be parsed.
    #[snafu(display("cannot parse type {input:?}: {reason}"))]
    ParseType { input: String, reason: &'static str },

    /// An operation was erased while one of its results still had users.
    #[snafu(display("cannot erase '{op}': result {value} still has {uses} use(s)"))]
    EraseWithUses { op: OpName, value: ValueId, uses: usize },

    /// `memref.alloc` needs one size operand per dynamic dimension.
    #[snafu(display("alloc of {ty} expects {expected} dynamic size(s), got {actual}"))]
    AllocSizeMismatch { ty: Type, expected: usize, actual: usize },

    /// A shape query was made on a value without a ranked shape.
    #[snafu(display("value {value} of type {ty} has no ranked shape"))]
    NotRanked { value: ValueId, ty: Type },

    /// Structural check of a function failed.
    #[snafu(display("verification failed at '{op}': {message}"))]
    Verification { op: OpName, message: String },

    /// A materialization callback was handed the wrong number of inputs.
    #[snafu(display("{kind} materialization expects exactly one input, got {actual}"))]
    MaterializationArity { kind: MaterializationKind, actual: usize },

    /// A materialization callback was handed an input type it cannot bridge.
    #[snafu(display("{kind} materialization cannot bridge {from} to {to}"))]
    MaterializationInput { kind: MaterializationKind, from: Type, to: Type },

    /// No registered materialization produced a value.
    #[snafu(display("failed to materialize {kind} conversion of {value} to {to}"))]
    MaterializationFailed { kind: MaterializationKind, value: ValueId, to: Type },

    /// A pattern reported success without replacing or erasing its root.
    #[snafu(display("pattern '{pattern}' rewrote '{op}' without replacing it"))]
    MissingReplacement { pattern: String, op: OpName },

    /// A pattern replaced its root with the wrong number of values.
    #[snafu(display("'{op}' has {expected} result(s) but was replaced with {actual} value(s)"))]
    ReplacementArity { op: OpName, expected: usize, actual: usize },

    /// Some operations were still illegal after the conversion finished.
    #[snafu(display("conversion failed, {illegal} illegal operation(s) remain:\n{diagnostics}"))]
    ConversionFailed { illegal: usize, diagnostics: Diagnostics },

    /// More illegal operations were handed to the patterns than the budget allows.
    #[snafu(display("conversion did not converge within {limit} legalization attempts"))]
    IterationLimit { limit: usize },
}
