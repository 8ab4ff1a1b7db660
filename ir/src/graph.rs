//! Arena-backed operation graph.
//!
//! Operations and values live in append-only arenas and are addressed by
//! [`OpId`] / [`ValueId`]. A separate `order` vector holds the live
//! operations of the single body block in program order. Erasing an
//! operation only tombstones its arena slot, so ids stay stable for the
//! whole lifetime of a graph; the conversion driver relies on that to keep
//! worklists and value maps keyed by id.
//!
//! Because the arenas only grow, a [`Checkpoint`] taken before a rewrite can
//! undo every operation and value created after it by truncation.

use std::fmt;

use smallvec::SmallVec;
use snafu::ensure;

use crate::attribute::{Attribute, Attributes};
use crate::error::{EraseWithUsesSnafu, Result};
use crate::location::Location;
use crate::types::Type;

/// Identifier of an operation in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u32);

impl OpId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Identifier of an SSA value in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u32);

impl ValueId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Fully qualified operation name, `dialect.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpName {
    dialect: &'static str,
    name: &'static str,
}

impl OpName {
    pub const fn new(dialect: &'static str, name: &'static str) -> Self {
        Self { dialect, name }
    }

    pub const fn dialect(&self) -> &'static str {
        self.dialect
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dialect, self.name)
    }
}

/// Where a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// The `index`-th argument of the enclosing function.
    Argument(usize),
    /// The `index`-th result of `op`.
    OpResult { op: OpId, index: usize },
}

#[derive(Debug, Clone)]
struct ValueData {
    ty: Type,
    def: ValueDef,
}

/// A node of the graph.
#[derive(Debug, Clone)]
pub struct Operation {
    name: OpName,
    operands: SmallVec<[ValueId; 4]>,
    results: SmallVec<[ValueId; 2]>,
    attributes: Attributes,
    location: Location,
}

impl Operation {
    pub fn name(&self) -> OpName {
        self.name
    }

    pub fn operands(&self) -> &[ValueId] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> ValueId {
        self.operands[index]
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    pub fn results(&self) -> &[ValueId] {
        &self.results
    }

    pub fn result(&self, index: usize) -> ValueId {
        self.results[index]
    }

    pub fn num_results(&self) -> usize {
        self.results.len()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn is_a(&self, name: OpName) -> bool {
        self.name == name
    }
}

/// Everything needed to create an operation.
#[derive(Debug, Clone)]
pub struct OperationState {
    pub name: OpName,
    pub operands: SmallVec<[ValueId; 4]>,
    pub result_types: SmallVec<[Type; 2]>,
    pub attributes: Attributes,
    pub location: Option<Location>,
}

impl OperationState {
    pub fn new(name: OpName) -> Self {
        Self {
            name,
            operands: SmallVec::new(),
            result_types: SmallVec::new(),
            attributes: Attributes::new(),
            location: None,
        }
    }

    pub fn operand(mut self, value: ValueId) -> Self {
        self.operands.push(value);
        self
    }

    pub fn operands(mut self, values: impl IntoIterator<Item = ValueId>) -> Self {
        self.operands.extend(values);
        self
    }

    pub fn result(mut self, ty: Type) -> Self {
        self.result_types.push(ty);
        self
    }

    pub fn results(mut self, types: impl IntoIterator<Item = Type>) -> Self {
        self.result_types.extend(types);
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<Attribute>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// Where newly created operations go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPoint {
    /// Append at the end of the block.
    End,
    /// Immediately before the given operation. Consecutive insertions keep
    /// their creation order.
    Before(OpId),
}

/// Arena sizes at some point in time; see [`Graph::rollback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    ops: usize,
    values: usize,
}

/// Single-block graph of operations.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    ops: Vec<Option<Operation>>,
    values: Vec<ValueData>,
    order: Vec<OpId>,
    arguments: Vec<ValueId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Values
    // =========================================================================

    fn new_value(&mut self, ty: Type, def: ValueDef) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { ty, def });
        id
    }

    pub fn add_argument(&mut self, ty: Type) -> ValueId {
        let index = self.arguments.len();
        let value = self.new_value(ty, ValueDef::Argument(index));
        self.arguments.push(value);
        value
    }

    pub fn arguments(&self) -> &[ValueId] {
        &self.arguments
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        &self.values[value.index()].ty
    }

    pub fn value_def(&self, value: ValueId) -> ValueDef {
        self.values[value.index()].def
    }

    pub fn defining_op(&self, value: ValueId) -> Option<OpId> {
        match self.value_def(value) {
            ValueDef::OpResult { op, .. } => Some(op),
            ValueDef::Argument(_) => None,
        }
    }

    /// Whether the value is an argument or a result of a live operation.
    pub fn is_value_live(&self, value: ValueId) -> bool {
        value.index() < self.values.len() && self.defining_op(value).is_none_or(|op| self.is_live(op))
    }

    // =========================================================================
    // Operations
    // =========================================================================

    pub fn is_live(&self, op: OpId) -> bool {
        self.ops.get(op.index()).is_some_and(Option::is_some)
    }

    pub fn try_op(&self, op: OpId) -> Option<&Operation> {
        self.ops.get(op.index()).and_then(Option::as_ref)
    }

    /// Borrow a live operation.
    ///
    /// # Panics
    /// If `op` was erased or never belonged to this graph.
    pub fn op(&self, op: OpId) -> &Operation {
        match self.try_op(op) {
            Some(operation) => operation,
            None => panic!("{op} is not a live operation"),
        }
    }

    fn op_mut(&mut self, op: OpId) -> &mut Operation {
        match self.ops.get_mut(op.index()).and_then(Option::as_mut) {
            Some(operation) => operation,
            None => panic!("{op} is not a live operation"),
        }
    }

    /// Live operations in program order.
    pub fn ops(&self) -> &[OpId] {
        &self.order
    }

    pub fn num_ops(&self) -> usize {
        self.order.len()
    }

    /// Live operations with the given name, in program order.
    pub fn ops_named(&self, name: OpName) -> impl Iterator<Item = OpId> + '_ {
        self.order.iter().copied().filter(move |&op| self.op(op).name == name)
    }

    pub fn position(&self, op: OpId) -> Option<usize> {
        self.order.iter().position(|&o| o == op)
    }

    /// Create an operation at `point`. The state's location wins over
    /// `default_location`.
    pub fn insert(&mut self, point: InsertPoint, state: OperationState, default_location: &Location) -> OpId {
        let id = OpId(self.ops.len() as u32);
        let results = state
            .result_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| self.new_value(ty, ValueDef::OpResult { op: id, index }))
            .collect();

        self.ops.push(Some(Operation {
            name: state.name,
            operands: state.operands,
            results,
            attributes: state.attributes,
            location: state.location.unwrap_or_else(|| default_location.clone()),
        }));

        match point {
            InsertPoint::End => self.order.push(id),
            InsertPoint::Before(anchor) => match self.position(anchor) {
                Some(pos) => self.order.insert(pos, id),
                None => panic!("insertion anchor {anchor} is not a live operation"),
            },
        }
        id
    }

    /// Create a copy of `op` with new operands and result types, keeping its
    /// name, attributes and location.
    pub fn clone_op_with(
        &mut self,
        point: InsertPoint,
        op: OpId,
        operands: impl IntoIterator<Item = ValueId>,
        result_types: impl IntoIterator<Item = Type>,
    ) -> OpId {
        let original = self.op(op);
        let location = original.location.clone();
        let state = OperationState::new(original.name)
            .operands(operands)
            .results(result_types)
            .attributes(original.attributes.clone())
            .location(location.clone());
        self.insert(point, state, &location)
    }

    pub fn set_operand(&mut self, op: OpId, index: usize, value: ValueId) {
        self.op_mut(op).operands[index] = value;
    }

    /// Live operations using `value`, in program order. An operation using
    /// the value several times is listed once.
    pub fn users(&self, value: ValueId) -> Vec<OpId> {
        self.order.iter().copied().filter(|&op| self.op(op).operands.contains(&value)).collect()
    }

    pub fn num_uses(&self, value: ValueId) -> usize {
        self.order.iter().map(|&op| self.op(op).operands.iter().filter(|&&v| v == value).count()).sum()
    }

    pub fn has_uses(&self, value: ValueId) -> bool {
        self.order.iter().any(|&op| self.op(op).operands.contains(&value))
    }

    /// Point every use of `from` at `to`.
    pub fn replace_all_uses_with(&mut self, from: ValueId, to: ValueId) {
        if from == to {
            return;
        }
        for slot in self.ops.iter_mut().flatten() {
            for operand in slot.operands.iter_mut().filter(|v| **v == from) {
                *operand = to;
            }
        }
    }

    /// Remove an operation whose results have no remaining uses.
    pub fn erase_op(&mut self, op: OpId) -> Result<()> {
        let operation = self.op(op);
        for &value in operation.results.iter() {
            let uses = self.num_uses(value);
            ensure!(uses == 0, EraseWithUsesSnafu { op: operation.name, value, uses });
        }
        self.order.retain(|&o| o != op);
        self.ops[op.index()] = None;
        Ok(())
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { ops: self.ops.len(), values: self.values.len() }
    }

    /// Forget every operation and value created since `checkpoint`.
    ///
    /// Only creations are undone: callers must not have mutated or erased
    /// pre-existing operations in between.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.order.retain(|op| op.index() < checkpoint.ops);
        self.ops.truncate(checkpoint.ops);
        self.values.truncate(checkpoint.values);
    }

    /// Operations created since `checkpoint` that are still live.
    pub fn created_since(&self, checkpoint: Checkpoint) -> impl Iterator<Item = OpId> + '_ {
        (checkpoint.ops..self.ops.len()).map(|i| OpId(i as u32)).filter(|&op| self.is_live(op))
    }
}
