//! Function-like units: the granularity passes run on.

use crate::builder::OpBuilder;
use crate::dialect::func;
use crate::graph::{Graph, OpId, ValueId};
use crate::types::Type;

/// A named single-block body with typed arguments.
#[derive(Debug, Clone)]
pub struct Func {
    name: String,
    body: Graph,
}

impl Func {
    pub fn new(name: impl Into<String>, argument_types: impl IntoIterator<Item = Type>) -> Self {
        let mut body = Graph::new();
        for ty in argument_types {
            body.add_argument(ty);
        }
        Self { name: name.into(), body }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Graph {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Graph {
        &mut self.body
    }

    pub fn arguments(&self) -> &[ValueId] {
        self.body.arguments()
    }

    pub fn argument(&self, index: usize) -> ValueId {
        self.body.arguments()[index]
    }

    /// Builder appending to the end of the body.
    pub fn builder(&mut self) -> OpBuilder<'_> {
        OpBuilder::at_end(&mut self.body)
    }

    /// The terminating `func.return`, if the body has one.
    pub fn terminator(&self) -> Option<OpId> {
        self.body.ops().last().copied().filter(|&op| self.body.op(op).is_a(func::RETURN))
    }

    /// Values handed back by the terminator.
    pub fn return_values(&self) -> &[ValueId] {
        self.terminator().map_or(&[][..], |op| self.body.op(op).operands())
    }
}
