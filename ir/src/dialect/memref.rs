//! Buffer allocation, copies, casts and shape queries.

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};
use tmir_dtype::DType;

use crate::attribute::Attribute;
use crate::builder::OpBuilder;
use crate::dialect::{arith, tensor};
use crate::error::{AllocSizeMismatchSnafu, NotRankedSnafu, Result};
use crate::graph::{OpId, OpName, OperationState, ValueId};
use crate::types::{Dim, RankedType, Type};

pub const DIALECT: &str = "memref";

pub const ALLOC: OpName = OpName::new(DIALECT, "alloc");
pub const COPY: OpName = OpName::new(DIALECT, "copy");
pub const CAST: OpName = OpName::new(DIALECT, "cast");
pub const DIM: OpName = OpName::new(DIALECT, "dim");

/// Optional byte alignment of an `alloc`.
pub const ALIGNMENT: &str = "alignment";

/// A dimension extent that is either known statically or computed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedSize {
    Static(usize),
    Dynamic(ValueId),
}

/// Fresh, uninitialized buffer of type `ty`.
///
/// `dynamic_sizes` supplies one `index` value per dynamic dimension, in order.
pub fn alloc(
    b: &mut OpBuilder<'_>,
    ty: RankedType,
    dynamic_sizes: &[ValueId],
    alignment: Option<u64>,
) -> Result<ValueId> {
    let expected = ty.num_dynamic_dims();
    let ty = Type::MemRef(ty);
    ensure!(dynamic_sizes.len() == expected, AllocSizeMismatchSnafu { ty, expected, actual: dynamic_sizes.len() });

    let mut state = OperationState::new(ALLOC).operands(dynamic_sizes.iter().copied()).result(ty);
    if let Some(alignment) = alignment {
        state = state.attr(ALIGNMENT, Attribute::Int(alignment as i64));
    }
    Ok(b.create_value(state))
}

/// Fresh buffer whose shape is given by `sizes`: static entries become static
/// dimensions, dynamic entries become dynamic dimensions fed by the value.
pub fn alloc_mixed(b: &mut OpBuilder<'_>, sizes: &[MixedSize], dtype: DType) -> ValueId {
    let mut dynamic_sizes: SmallVec<[ValueId; 4]> = SmallVec::new();
    let shape = sizes.iter().map(|size| match size {
        MixedSize::Static(n) => Dim::Static(*n),
        MixedSize::Dynamic(value) => {
            dynamic_sizes.push(*value);
            Dim::Dynamic
        }
    });
    let ty = Type::MemRef(RankedType::new(shape.collect::<SmallVec<[Dim; 4]>>(), dtype));
    b.create_value(OperationState::new(ALLOC).operands(dynamic_sizes).result(ty))
}

pub fn copy(b: &mut OpBuilder<'_>, source: ValueId, target: ValueId) -> OpId {
    b.create(OperationState::new(COPY).operand(source).operand(target))
}

/// Reinterpret `source` as `ty` without touching the data.
pub fn cast(b: &mut OpBuilder<'_>, source: ValueId, ty: Type) -> ValueId {
    b.create_value(OperationState::new(CAST).operand(source).result(ty))
}

/// Runtime extent of dimension `index` of a buffer.
pub fn dim(b: &mut OpBuilder<'_>, source: ValueId, index: usize) -> ValueId {
    let index = arith::constant_index(b, index);
    b.create_value(OperationState::new(DIM).operand(source).operand(index).result(Type::Index))
}

/// Extents of every dimension of a ranked tensor or buffer. Static
/// dimensions are returned as-is; dynamic ones are queried with
/// `memref.dim` / `tensor.dim` at the insertion point.
pub fn mixed_sizes(b: &mut OpBuilder<'_>, value: ValueId) -> Result<SmallVec<[MixedSize; 4]>> {
    let ty = b.value_type(value).clone();
    let ranked = ty.as_ranked().context(NotRankedSnafu { value, ty: ty.clone() })?;

    let mut sizes = SmallVec::with_capacity(ranked.rank());
    for (index, extent) in ranked.shape().iter().enumerate() {
        let size = match extent {
            Dim::Static(n) => MixedSize::Static(*n),
            Dim::Dynamic if ty.is_tensor() => MixedSize::Dynamic(tensor::dim(b, value, index)),
            Dim::Dynamic => MixedSize::Dynamic(dim(b, value, index)),
        };
        sizes.push(size);
    }
    Ok(sizes)
}
