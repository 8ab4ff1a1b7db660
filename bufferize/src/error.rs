//! Errors of the bufferization pass.

use snafu::Snafu;
use tmir_ir::{OpName, Type};

/// Result type for bufferization.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while allocating result buffers or running the pass.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Building or querying IR failed.
    #[snafu(display("{source}"))]
    Ir { source: tmir_ir::Error },

    /// Only ranked tensor results have a buffer shape to allocate.
    #[snafu(display("tensor to buffer conversion expects ranked tensor results, '{op}' result #{index} is {ty}"))]
    UnrankedResult { op: OpName, index: usize, ty: Type },

    /// Every result must have exactly one tied output.
    #[snafu(display("'{op}' has {outputs} output(s) but {results} result(s)"))]
    OutputCount { op: OpName, outputs: usize, results: usize },

    /// The conversion of a function failed; the function is left untouched.
    #[snafu(display("bufferization of @{func} failed: {source}"))]
    PassFailed { func: String, source: tmir_ir::Error },
}

impl From<tmir_ir::Error> for Error {
    fn from(source: tmir_ir::Error) -> Self {
        Self::Ir { source }
    }
}
