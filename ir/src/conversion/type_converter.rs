//! Pluggable type conversion with materialization hooks.

use std::fmt;

use crate::builder::OpBuilder;
use crate::error::Result;
use crate::graph::{Graph, OpId, ValueId};
use crate::types::Type;

/// Type mapping callback. `None` means "not handled here, ask the next one".
pub type ConversionFn = Box<dyn Fn(&Type) -> Option<Type>>;

/// Builds a value of the requested type out of `inputs`.
///
/// `Ok(None)` declines (another materialization may still succeed), `Err`
/// reports a contract violation that aborts the whole conversion.
pub type MaterializationFn = Box<dyn Fn(&mut OpBuilder<'_>, &Type, &[ValueId]) -> Result<Option<ValueId>>>;

/// Maps original types to converted types and bridges the two worlds while a
/// conversion is in progress.
///
/// Conversions and materializations are tried most-recently-added first. A
/// type that no conversion handles has no legal form.
#[derive(Default)]
pub struct TypeConverter {
    conversions: Vec<ConversionFn>,
    source_materializations: Vec<MaterializationFn>,
    target_materializations: Vec<MaterializationFn>,
}

impl TypeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_conversion(&mut self, f: impl Fn(&Type) -> Option<Type> + 'static) {
        self.conversions.push(Box::new(f));
    }

    /// Materialization from a converted value back to an original type.
    pub fn add_source_materialization(
        &mut self,
        f: impl Fn(&mut OpBuilder<'_>, &Type, &[ValueId]) -> Result<Option<ValueId>> + 'static,
    ) {
        self.source_materializations.push(Box::new(f));
    }

    /// Materialization from an original value to a converted type.
    pub fn add_target_materialization(
        &mut self,
        f: impl Fn(&mut OpBuilder<'_>, &Type, &[ValueId]) -> Result<Option<ValueId>> + 'static,
    ) {
        self.target_materializations.push(Box::new(f));
    }

    pub fn convert_type(&self, ty: &Type) -> Option<Type> {
        self.conversions.iter().rev().find_map(|convert| convert(ty))
    }

    /// Whether `ty` already is its own converted form.
    pub fn is_legal_type(&self, ty: &Type) -> bool {
        self.convert_type(ty).is_some_and(|converted| &converted == ty)
    }

    /// Whether every operand and result of `op` has a legal type.
    pub fn is_legal_op(&self, graph: &Graph, op: OpId) -> bool {
        let operation = graph.op(op);
        operation.operands().iter().chain(operation.results()).all(|&v| self.is_legal_type(graph.value_type(v)))
    }

    pub fn materialize_source(&self, b: &mut OpBuilder<'_>, ty: &Type, inputs: &[ValueId]) -> Result<Option<ValueId>> {
        materialize(&self.source_materializations, b, ty, inputs)
    }

    pub fn materialize_target(&self, b: &mut OpBuilder<'_>, ty: &Type, inputs: &[ValueId]) -> Result<Option<ValueId>> {
        materialize(&self.target_materializations, b, ty, inputs)
    }
}

fn materialize(
    callbacks: &[MaterializationFn],
    b: &mut OpBuilder<'_>,
    ty: &Type,
    inputs: &[ValueId],
) -> Result<Option<ValueId>> {
    for callback in callbacks.iter().rev() {
        if let Some(value) = callback(b, ty, inputs)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverter")
            .field("conversions", &self.conversions.len())
            .field("source_materializations", &self.source_materializations.len())
            .field("target_materializations", &self.target_materializations.len())
            .finish()
    }
}
