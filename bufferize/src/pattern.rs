use tmir_ir::conversion::{ConversionPattern, ConversionRewriter, RewriteResult};
use tmir_ir::{InterfaceRegistry, OpId, ValueId};

use crate::allocation::allocate_buffers_for_results;

/// Rewrites any tensor-algebra op from tensor to buffer semantics.
///
/// One pattern covers every op kind registered in the [`InterfaceRegistry`]:
/// the converted operands are split into inputs and outputs, each result gets
/// a buffer, and the op is rebuilt result-less over `inputs ++ buffers`. The
/// old results are replaced by the buffers.
#[derive(Debug, Clone)]
pub struct BufferizeTensorAlgebraOp {
    registry: InterfaceRegistry,
}

impl BufferizeTensorAlgebraOp {
    pub fn new(registry: InterfaceRegistry) -> Self {
        Self { registry }
    }
}

impl ConversionPattern for BufferizeTensorAlgebraOp {
    fn name(&self) -> &str {
        "bufferize-tensor-algebra-op"
    }

    fn match_and_rewrite(
        &self,
        op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> tmir_ir::Result<RewriteResult> {
        let Some(iface) = self.registry.tensor_algebra(rewriter.op().name()) else {
            return Ok(RewriteResult::NoMatch);
        };
        let (inputs, outputs) = operands.split_at(iface.num_inputs(rewriter.op()).min(operands.len()));

        let mut b = rewriter.builder();
        let buffers = match allocate_buffers_for_results(&mut b, iface, op, outputs) {
            Ok(buffers) => buffers,
            Err(err) => {
                rewriter.emit_error(err.to_string());
                rewriter.emit_error("failed to allocate buffers for tensor results");
                return Ok(RewriteResult::Failed);
            }
        };

        b.clone_op(op, inputs.iter().chain(&buffers).copied(), std::iter::empty());
        rewriter.replace_op(buffers);
        Ok(RewriteResult::Rewritten)
    }
}
