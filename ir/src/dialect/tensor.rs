use snafu::ensure;

use crate::builder::OpBuilder;
use crate::dialect::arith;
use crate::error::{AllocSizeMismatchSnafu, Result};
use crate::graph::{OpName, OperationState, ValueId};
use crate::types::{RankedType, Type};

pub const DIALECT: &str = "tensor";

pub const EMPTY: OpName = OpName::new(DIALECT, "empty");
pub const DIM: OpName = OpName::new(DIALECT, "dim");

/// Tensor with unspecified contents, used as the initial value of
/// write-only outputs.
pub fn empty(b: &mut OpBuilder<'_>, ty: RankedType, dynamic_sizes: &[ValueId]) -> Result<ValueId> {
    let expected = ty.num_dynamic_dims();
    let ty = Type::RankedTensor(ty);
    ensure!(dynamic_sizes.len() == expected, AllocSizeMismatchSnafu { ty, expected, actual: dynamic_sizes.len() });
    Ok(b.create_value(OperationState::new(EMPTY).operands(dynamic_sizes.iter().copied()).result(ty)))
}

/// Runtime extent of dimension `index` of a tensor.
pub fn dim(b: &mut OpBuilder<'_>, tensor: ValueId, index: usize) -> ValueId {
    let index = arith::constant_index(b, index);
    b.create_value(OperationState::new(DIM).operand(tensor).operand(index).result(Type::Index))
}
