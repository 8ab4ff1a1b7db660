use crate::builder::OpBuilder;
use crate::graph::{OpId, OpName, OperationState, ValueId};

pub const DIALECT: &str = "func";

pub const RETURN: OpName = OpName::new(DIALECT, "return");

pub fn return_(b: &mut OpBuilder<'_>, values: impl IntoIterator<Item = ValueId>) -> OpId {
    b.create(OperationState::new(RETURN).operands(values))
}
