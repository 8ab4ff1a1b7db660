//! Which operations a conversion must get rid of.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::graph::{Graph, OpId, OpName};

/// Legality predicate for dynamically legal dialects.
pub type LegalityFn = Box<dyn Fn(&Graph, OpId) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Legality {
    /// Must not be touched.
    Legal,
    /// Must be rewritten before the conversion can succeed.
    Illegal,
    /// Not covered by the target; left alone.
    Unknown,
}

/// Legality policy of a partial conversion.
///
/// Precedence: explicitly legal ops, then always-legal dialects, then
/// dynamically legal dialects. Anything else is [`Legality::Unknown`].
#[derive(Default)]
pub struct ConversionTarget {
    legal_ops: HashSet<OpName>,
    legal_dialects: HashSet<&'static str>,
    dynamic_dialects: HashMap<&'static str, LegalityFn>,
}

impl ConversionTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_legal_op(&mut self, name: OpName) {
        self.legal_ops.insert(name);
    }

    pub fn add_legal_dialect(&mut self, dialect: &'static str) {
        self.legal_dialects.insert(dialect);
    }

    pub fn add_legal_dialects(&mut self, dialects: impl IntoIterator<Item = &'static str>) {
        self.legal_dialects.extend(dialects);
    }

    /// Ops of `dialect` are legal exactly when `predicate` holds.
    pub fn add_dynamically_legal_dialect(
        &mut self,
        dialect: &'static str,
        predicate: impl Fn(&Graph, OpId) -> bool + 'static,
    ) {
        self.dynamic_dialects.insert(dialect, Box::new(predicate));
    }

    pub fn legality(&self, graph: &Graph, op: OpId) -> Legality {
        let name = graph.op(op).name();
        let legality = if self.legal_ops.contains(&name) || self.legal_dialects.contains(name.dialect()) {
            Legality::Legal
        } else if let Some(predicate) = self.dynamic_dialects.get(name.dialect()) {
            if predicate(graph, op) { Legality::Legal } else { Legality::Illegal }
        } else {
            Legality::Unknown
        };
        tracing::trace!(op = %name, id = %op, %legality, "legality");
        legality
    }

    pub fn is_illegal(&self, graph: &Graph, op: OpId) -> bool {
        self.legality(graph, op) == Legality::Illegal
    }
}

impl fmt::Debug for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut legal: Vec<_> = self.legal_dialects.iter().copied().collect();
        legal.sort_unstable();
        let mut dynamic: Vec<_> = self.dynamic_dialects.keys().copied().collect();
        dynamic.sort_unstable();
        f.debug_struct("ConversionTarget")
            .field("legal_ops", &self.legal_ops.len())
            .field("legal_dialects", &legal)
            .field("dynamic_dialects", &dynamic)
            .finish()
    }
}
