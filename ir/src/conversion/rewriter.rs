use smallvec::SmallVec;

use crate::builder::OpBuilder;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::graph::{Graph, InsertPoint, OpId, Operation, ValueId};

use super::type_converter::TypeConverter;

/// Mutation handle given to a [`ConversionPattern`](super::ConversionPattern).
///
/// New operations land immediately before the root and inherit its location.
/// The root itself is only replaced once the pattern reports success; until
/// then the replacement is just recorded.
pub struct ConversionRewriter<'a> {
    graph: &'a mut Graph,
    root: OpId,
    converter: &'a TypeConverter,
    diagnostics: &'a mut Diagnostics,
    replacement: Option<SmallVec<[ValueId; 2]>>,
}

impl<'a> ConversionRewriter<'a> {
    pub(crate) fn new(
        graph: &'a mut Graph,
        root: OpId,
        converter: &'a TypeConverter,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self { graph, root, converter, diagnostics, replacement: None }
    }

    pub fn root(&self) -> OpId {
        self.root
    }

    pub fn op(&self) -> &Operation {
        self.graph.op(self.root)
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    pub fn converter(&self) -> &TypeConverter {
        self.converter
    }

    /// Builder inserting before the root.
    pub fn builder(&mut self) -> OpBuilder<'_> {
        let location = self.graph.op(self.root).location().clone();
        OpBuilder::new(&mut *self.graph, InsertPoint::Before(self.root)).with_location(location)
    }

    /// Replace the root's results, position by position, with `values`.
    pub fn replace_op(&mut self, values: impl IntoIterator<Item = ValueId>) {
        self.replacement = Some(values.into_iter().collect());
    }

    /// Report an error against the root.
    pub fn emit_error(&mut self, message: impl Into<String>) {
        let operation = self.graph.op(self.root);
        self.diagnostics.emit(Diagnostic::op_error(operation.name(), operation.location().clone(), message));
    }

    pub(crate) fn take_replacement(&mut self) -> Option<SmallVec<[ValueId; 2]>> {
        self.replacement.take()
    }
}
