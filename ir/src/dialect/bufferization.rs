//! Views bridging tensors and buffers.
//!
//! `to_tensor` wraps a buffer as a read-only tensor; `to_buffer` exposes the
//! storage behind a tensor. Both alias: writing through the buffer of a
//! `to_buffer` is observable by every reader of the tensor, which is exactly
//! what the bufferization pass must never do to a live value.

use crate::builder::OpBuilder;
use crate::graph::{OpName, OperationState, ValueId};
use crate::types::Type;

pub const DIALECT: &str = "bufferization";

pub const TO_TENSOR: OpName = OpName::new(DIALECT, "to_tensor");
pub const TO_BUFFER: OpName = OpName::new(DIALECT, "to_buffer");

pub fn to_tensor(b: &mut OpBuilder<'_>, ty: Type, buffer: ValueId) -> ValueId {
    b.create_value(OperationState::new(TO_TENSOR).operand(buffer).result(ty))
}

pub fn to_buffer(b: &mut OpBuilder<'_>, ty: Type, tensor: ValueId) -> ValueId {
    b.create_value(OperationState::new(TO_BUFFER).operand(tensor).result(ty))
}
