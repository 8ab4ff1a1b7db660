//! Tensor-algebra operations in destination-passing style.
//!
//! Every op takes `ins(...)` followed by `outs(...)`. With tensor operands the
//! op returns one result per output, each result tied to its output; with
//! buffer operands it returns nothing and writes through the outputs.
//!
//! | Op          | ins                    | outs                       | reads outs |
//! |-------------|------------------------|----------------------------|------------|
//! | `scan`      | input                  | output, accumulator        | accumulator |
//! | `scatter`   | updates, indices       | original                   | yes |
//! | `sort`      |                        | keys, payloads...          | yes |
//! | `topk`      | values                 | values, indices            | no |
//! | `attention` | query, key, value      | result                     | no |

use smallvec::smallvec;

use crate::attribute::{Attribute, Attributes};
use crate::builder::OpBuilder;
use crate::graph::{OpId, OpName, Operation, OperationState, ValueId};
use crate::interfaces::{InterfaceRegistry, OPERAND_SEGMENT_SIZES, TensorAlgebraOp};

pub const DIALECT: &str = "tm_tensor";

pub const SCAN: OpName = OpName::new(DIALECT, "scan");
pub const SCATTER: OpName = OpName::new(DIALECT, "scatter");
pub const SORT: OpName = OpName::new(DIALECT, "sort");
pub const TOPK: OpName = OpName::new(DIALECT, "topk");
pub const ATTENTION: OpName = OpName::new(DIALECT, "attention");

/// Dimension the op iterates along.
pub const DIMENSION: &str = "dimension";
/// Whether a scan includes the current element.
pub const INCLUSIVE: &str = "inclusive";
/// Scatter combiner, see [`ScatterCombiner`].
pub const COMBINER: &str = "combiner";
/// Sort order.
pub const DESCENDING: &str = "descending";

/// How a scatter merges an update into the original element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ScatterCombiner {
    /// `original + update`
    Add,
    /// `update`
    Assign,
}

pub fn dimension(op: &Operation) -> usize {
    op.attr(DIMENSION).and_then(Attribute::as_int).map_or(0, |d| d as usize)
}

pub fn is_inclusive(op: &Operation) -> bool {
    op.attr(INCLUSIVE).and_then(Attribute::as_bool).unwrap_or(true)
}

pub fn is_descending(op: &Operation) -> bool {
    op.attr(DESCENDING).and_then(Attribute::as_bool).unwrap_or(false)
}

pub fn combiner(op: &Operation) -> ScatterCombiner {
    op.attr(COMBINER).and_then(Attribute::as_str).and_then(|s| s.parse().ok()).unwrap_or(ScatterCombiner::Add)
}

// =========================================================================
// Interface implementations
// =========================================================================

/// Cumulative reduction; the accumulator carries the running value in and out.
pub struct ScanOp;

impl TensorAlgebraOp for ScanOp {
    fn reads_initial_value(&self, _op: &Operation, output: usize) -> bool {
        output == 1
    }
}

/// Indexed update of `original`. Elements not addressed by any index keep
/// their initial value, so the output is always read.
pub struct ScatterOp;

impl TensorAlgebraOp for ScatterOp {
    fn reads_initial_value(&self, _op: &Operation, _output: usize) -> bool {
        true
    }
}

/// In-place sort of its outputs.
pub struct SortOp;

impl TensorAlgebraOp for SortOp {
    fn reads_initial_value(&self, _op: &Operation, _output: usize) -> bool {
        true
    }
}

pub struct TopkOp;

impl TensorAlgebraOp for TopkOp {
    fn reads_initial_value(&self, _op: &Operation, _output: usize) -> bool {
        false
    }
}

pub struct AttentionOp;

impl TensorAlgebraOp for AttentionOp {
    fn reads_initial_value(&self, _op: &Operation, _output: usize) -> bool {
        false
    }
}

pub fn register(registry: &mut InterfaceRegistry) {
    registry.register_tensor_algebra(SCAN, ScanOp);
    registry.register_tensor_algebra(SCATTER, ScatterOp);
    registry.register_tensor_algebra(SORT, SortOp);
    registry.register_tensor_algebra(TOPK, TopkOp);
    registry.register_tensor_algebra(ATTENTION, AttentionOp);
}

// =========================================================================
// Builders
// =========================================================================

/// Generic destination-style builder. Results mirror the outputs when the
/// outputs are tensors; buffer outputs produce a result-less op.
pub fn build(
    b: &mut OpBuilder<'_>,
    name: OpName,
    inputs: &[ValueId],
    outputs: &[ValueId],
    attributes: Attributes,
) -> OpId {
    let result_types: Vec<_> = if outputs.iter().all(|&v| b.value_type(v).is_tensor()) {
        outputs.iter().map(|&v| b.value_type(v).clone()).collect()
    } else {
        Vec::new()
    };

    let state = OperationState::new(name)
        .operands(inputs.iter().chain(outputs).copied())
        .results(result_types)
        .attributes(attributes)
        .attr(OPERAND_SEGMENT_SIZES, Attribute::IndexArray(smallvec![inputs.len(), outputs.len()]));
    b.create(state)
}

pub fn scan(
    b: &mut OpBuilder<'_>,
    input: ValueId,
    output: ValueId,
    accumulator: ValueId,
    dimension: usize,
    inclusive: bool,
) -> OpId {
    let attributes =
        Attributes::from([(DIMENSION, Attribute::Int(dimension as i64)), (INCLUSIVE, Attribute::Bool(inclusive))]);
    build(b, SCAN, &[input], &[output, accumulator], attributes)
}

pub fn scatter(
    b: &mut OpBuilder<'_>,
    updates: ValueId,
    indices: ValueId,
    original: ValueId,
    combiner: ScatterCombiner,
) -> OpId {
    let attributes = Attributes::from([(COMBINER, Attribute::Str(combiner.to_string()))]);
    build(b, SCATTER, &[updates, indices], &[original], attributes)
}

pub fn sort(b: &mut OpBuilder<'_>, outputs: &[ValueId], dimension: usize, descending: bool) -> OpId {
    let attributes =
        Attributes::from([(DIMENSION, Attribute::Int(dimension as i64)), (DESCENDING, Attribute::Bool(descending))]);
    build(b, SORT, &[], outputs, attributes)
}

pub fn topk(
    b: &mut OpBuilder<'_>,
    values: ValueId,
    out_values: ValueId,
    out_indices: ValueId,
    dimension: usize,
) -> OpId {
    let attributes = Attributes::from([(DIMENSION, Attribute::Int(dimension as i64))]);
    build(b, TOPK, &[values], &[out_values, out_indices], attributes)
}

pub fn attention(b: &mut OpBuilder<'_>, query: ValueId, key: ValueId, value: ValueId, output: ValueId) -> OpId {
    build(b, ATTENTION, &[query, key, value], &[output], Attributes::new())
}
