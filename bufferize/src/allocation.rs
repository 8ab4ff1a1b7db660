//! Output buffer allocation for rewritten tensor-algebra ops.
//!
//! Each tensor result needs a buffer the rebuilt op writes into. The choice
//! per result, in order:
//!
//! 1. the op reads the tied output's initial value: clone the tied buffer,
//! 2. the result shape is static: allocate that exact type,
//! 3. otherwise allocate with dynamic extents read off the tied buffer.
//!
//! A clone is required even when the tied buffer looks private: it may be a
//! view of a tensor other code still reads.

use smallvec::SmallVec;
use snafu::{OptionExt, ResultExt, ensure};
use tmir_ir::builder::OpBuilder;
use tmir_ir::dialect::memref;
use tmir_ir::error::NotRankedSnafu;
use tmir_ir::{OpId, TensorAlgebraOp, Type, ValueId};

use crate::error::{IrSnafu, OutputCountSnafu, Result, UnrankedResultSnafu};

/// Fresh buffer with the shape and element type of `buffer`, holding a copy
/// of its contents.
pub fn clone_buffer(b: &mut OpBuilder<'_>, buffer: ValueId) -> Result<ValueId> {
    let ty = b.value_type(buffer).clone();
    let dtype = ty.as_ranked().context(NotRankedSnafu { value: buffer, ty: ty.clone() }).context(IrSnafu)?.dtype();
    let sizes = memref::mixed_sizes(b, buffer).context(IrSnafu)?;
    let clone = memref::alloc_mixed(b, &sizes, dtype);
    memref::copy(b, buffer, clone);
    Ok(clone)
}

/// One buffer per result of `op`, created at the builder's insertion point.
///
/// `outputs` are the op's output operands already converted to buffers,
/// position `i` tied to result `i`. Fails without partial cleanup; the
/// caller is expected to roll back.
pub fn allocate_buffers_for_results(
    b: &mut OpBuilder<'_>,
    iface: &dyn TensorAlgebraOp,
    op: OpId,
    outputs: &[ValueId],
) -> Result<SmallVec<[ValueId; 2]>> {
    let operation = b.op(op);
    let name = operation.name();
    let result_types: SmallVec<[Type; 2]> =
        operation.results().iter().map(|&result| b.value_type(result).clone()).collect();
    let reads: SmallVec<[bool; 2]> = (0..result_types.len()).map(|i| iface.reads_initial_value(operation, i)).collect();
    ensure!(
        outputs.len() == result_types.len(),
        OutputCountSnafu { op: name, outputs: outputs.len(), results: result_types.len() }
    );

    let mut buffers = SmallVec::with_capacity(result_types.len());
    for (index, ty) in result_types.into_iter().enumerate() {
        let Type::RankedTensor(ranked) = ty else {
            return UnrankedResultSnafu { op: name, index, ty }.fail();
        };
        let tied = outputs[index];

        let buffer = if reads[index] {
            clone_buffer(b, tied)?
        } else if ranked.has_static_shape() {
            memref::alloc(b, ranked, &[], None).context(IrSnafu)?
        } else {
            let sizes = memref::mixed_sizes(b, tied).context(IrSnafu)?;
            memref::alloc_mixed(b, &sizes, ranked.dtype())
        };
        let buffer_ty = b.value_type(buffer);
        tracing::trace!(op = %name, index, buffer = %buffer, ty = %buffer_ty, read = reads[index], "result buffer");
        buffers.push(buffer);
    }
    Ok(buffers)
}
