use crate::error::Result;
use crate::graph::{OpId, ValueId};

use super::rewriter::ConversionRewriter;

/// Outcome of a single pattern application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RewriteResult {
    /// The pattern does not apply; nothing was reported.
    NoMatch,
    /// The root was replaced; the driver commits the changes.
    Rewritten,
    /// The pattern applies but could not finish. A diagnostic has been
    /// emitted and every created operation is rolled back.
    Failed,
}

/// Rewrite rule used by [`apply_partial_conversion`](super::apply_partial_conversion).
///
/// `operands` are the operands of `op` already remapped to their converted
/// types, in operand order. Patterns create new operations through the
/// rewriter and finish with [`ConversionRewriter::replace_op`].
pub trait ConversionPattern {
    fn name(&self) -> &str;

    fn match_and_rewrite(
        &self,
        op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> Result<RewriteResult>;
}
