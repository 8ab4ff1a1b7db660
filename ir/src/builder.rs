//! Insertion-point aware operation builder.

use crate::graph::{Graph, InsertPoint, OpId, Operation, OperationState, ValueId};
use crate::location::Location;
use crate::types::Type;

/// Creates operations at a fixed insertion point with a default location.
///
/// Dialect helpers (`memref::alloc`, `bufferization::to_tensor`, ...) take a
/// builder so the caller decides where the new operations land.
pub struct OpBuilder<'g> {
    graph: &'g mut Graph,
    point: InsertPoint,
    location: Location,
}

impl<'g> OpBuilder<'g> {
    pub fn new(graph: &'g mut Graph, point: InsertPoint) -> Self {
        Self { graph, point, location: Location::Unknown }
    }

    pub fn at_end(graph: &'g mut Graph) -> Self {
        Self::new(graph, InsertPoint::End)
    }

    pub fn before(graph: &'g mut Graph, op: OpId) -> Self {
        Self::new(graph, InsertPoint::Before(op))
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn insert_point(&self) -> InsertPoint {
        self.point
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut *self.graph
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        self.graph.value_type(value)
    }

    pub fn op(&self, op: OpId) -> &Operation {
        self.graph.op(op)
    }

    pub fn create(&mut self, state: OperationState) -> OpId {
        self.graph.insert(self.point, state, &self.location)
    }

    /// Create an operation and return its only result.
    ///
    /// # Panics
    /// If the state does not declare exactly one result.
    pub fn create_value(&mut self, state: OperationState) -> ValueId {
        assert_eq!(state.result_types.len(), 1, "'{}' must declare exactly one result", state.name);
        let op = self.create(state);
        self.graph.op(op).result(0)
    }

    /// Structural clone of `op` at the insertion point.
    pub fn clone_op(
        &mut self,
        op: OpId,
        operands: impl IntoIterator<Item = ValueId>,
        result_types: impl IntoIterator<Item = Type>,
    ) -> OpId {
        self.graph.clone_op_with(self.point, op, operands, result_types)
    }
}
