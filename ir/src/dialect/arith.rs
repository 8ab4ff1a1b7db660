use tmir_dtype::{DType, HasDType};

use crate::attribute::Attribute;
use crate::builder::OpBuilder;
use crate::graph::{Graph, OpName, OperationState, ValueId};
use crate::types::Type;

pub const DIALECT: &str = "arith";

pub const CONSTANT: OpName = OpName::new(DIALECT, "constant");

/// Attribute holding the constant payload.
pub const VALUE: &str = "value";

pub fn constant_index(b: &mut OpBuilder<'_>, value: usize) -> ValueId {
    b.create_value(OperationState::new(CONSTANT).attr(VALUE, value as i64).result(Type::Index))
}

pub fn constant_int(b: &mut OpBuilder<'_>, value: i64, dtype: DType) -> ValueId {
    b.create_value(OperationState::new(CONSTANT).attr(VALUE, value).result(Type::Scalar(dtype)))
}

pub fn constant_float(b: &mut OpBuilder<'_>, value: f64, dtype: DType) -> ValueId {
    b.create_value(OperationState::new(CONSTANT).attr(VALUE, value).result(Type::Scalar(dtype)))
}

/// Scalar constant whose element type follows from the Rust type of `value`.
pub fn constant_of<T: HasDType + Into<Attribute>>(b: &mut OpBuilder<'_>, value: T) -> ValueId {
    b.create_value(OperationState::new(CONSTANT).attr(VALUE, value).result(Type::Scalar(T::DTYPE)))
}

/// The index value produced by an `arith.constant`, if `value` is one.
pub fn as_constant_index(graph: &Graph, value: ValueId) -> Option<usize> {
    let op = graph.op(graph.defining_op(value)?);
    if !op.is_a(CONSTANT) || graph.value_type(value) != &Type::Index {
        return None;
    }
    op.attr(VALUE).and_then(Attribute::as_int).and_then(|v| usize::try_from(v).ok())
}
