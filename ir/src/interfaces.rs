//! Operation interfaces.
//!
//! An interface is a capability set shared by many operation kinds. Passes
//! match on the capability rather than on concrete names, so a single rewrite
//! rule covers every kind that registers an implementation.
//!
//! Implementations are looked up through an [`InterfaceRegistry`] that is
//! passed around explicitly; there is no process-wide registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::attribute::Attribute;
use crate::graph::{Graph, OpId, OpName, Operation, ValueId};

/// Attribute splitting the operand list into `[inputs, outputs]`.
pub const OPERAND_SEGMENT_SIZES: &str = "operand_segment_sizes";

/// `(inputs, outputs)` counts of a destination-style operation.
///
/// Falls back to "one output per result" when the segment attribute is
/// missing.
pub fn segment_sizes(op: &Operation) -> (usize, usize) {
    match op.attr(OPERAND_SEGMENT_SIZES).and_then(Attribute::as_index_array) {
        Some([inputs, outputs]) => (*inputs, *outputs),
        _ => {
            let outputs = op.num_results().min(op.num_operands());
            (op.num_operands() - outputs, outputs)
        }
    }
}

/// Tensor-algebra operation contract.
///
/// The operand list is `inputs ++ outputs`. Each output is tied to the result
/// at the same position while the operation works on tensors: the output
/// supplies the initial value the computation may read before overwriting it.
/// Once the operation works on buffers it has no results and writes through
/// the output buffers instead.
pub trait TensorAlgebraOp: Send + Sync {
    fn num_inputs(&self, op: &Operation) -> usize {
        segment_sizes(op).0
    }

    fn num_outputs(&self, op: &Operation) -> usize {
        segment_sizes(op).1
    }

    fn inputs<'a>(&self, op: &'a Operation) -> &'a [ValueId] {
        &op.operands()[..self.num_inputs(op)]
    }

    fn outputs<'a>(&self, op: &'a Operation) -> &'a [ValueId] {
        let start = self.num_inputs(op);
        &op.operands()[start..start + self.num_outputs(op)]
    }

    /// Whether the computation reads the initial value of output `output`.
    ///
    /// Write-only outputs may be backed by uninitialized memory; read-write
    /// outputs must start from a copy of the tied value.
    fn reads_initial_value(&self, op: &Operation, output: usize) -> bool;
}

/// Whether every output of `op` is a tensor and tied to a result.
pub fn has_tensor_semantics(graph: &Graph, iface: &dyn TensorAlgebraOp, op: OpId) -> bool {
    let operation = graph.op(op);
    let outputs = iface.outputs(operation);
    operation.num_results() == outputs.len() && outputs.iter().all(|&v| graph.value_type(v).is_tensor())
}

/// Whether `op` has no results and writes through buffer outputs.
pub fn has_buffer_semantics(graph: &Graph, iface: &dyn TensorAlgebraOp, op: OpId) -> bool {
    let operation = graph.op(op);
    operation.num_results() == 0 && iface.outputs(operation).iter().all(|&v| graph.value_type(v).is_buffer())
}

/// Interface implementations keyed by operation name.
#[derive(Clone, Default)]
pub struct InterfaceRegistry {
    tensor_algebra: HashMap<OpName, Arc<dyn TensorAlgebraOp>>,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in dialect registered.
    pub fn with_builtin_dialects() -> Self {
        let mut registry = Self::new();
        crate::dialect::tm_tensor::register(&mut registry);
        registry
    }

    pub fn register_tensor_algebra(&mut self, name: OpName, iface: impl TensorAlgebraOp + 'static) {
        self.tensor_algebra.insert(name, Arc::new(iface));
    }

    pub fn tensor_algebra(&self, name: OpName) -> Option<&dyn TensorAlgebraOp> {
        self.tensor_algebra.get(&name).map(|iface| iface.as_ref())
    }

    pub fn is_tensor_algebra(&self, name: OpName) -> bool {
        self.tensor_algebra.contains_key(&name)
    }
}

impl fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.tensor_algebra.keys().map(ToString::to_string).collect();
        names.sort();
        f.debug_struct("InterfaceRegistry").field("tensor_algebra", &names).finish()
    }
}
