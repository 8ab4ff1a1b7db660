//! Partial-conversion driver.
//!
//! # Algorithm
//!
//! Operations are visited from a FIFO worklist seeded in program order. For
//! each illegal operation:
//!
//! 1. Take a [`Checkpoint`] of the graph.
//! 2. Remap operands to their converted types: reuse a value produced for an
//!    earlier rewrite when there is one, otherwise insert a target
//!    materialization right before the operation.
//! 3. Try the patterns in order. The first one reporting
//!    [`RewriteResult::Rewritten`] wins; any other outcome rolls the graph back
//!    to the checkpoint before the next pattern runs.
//! 4. On success, route every use of an old result to its replacement. Uses
//!    that still expect the original type go through a source
//!    materialization, and the converted value is remembered so later
//!    operations consume it directly. Users and new operations are re-queued,
//!    then the root is erased.
//!
//! Only legalization attempts count against the iteration budget, so legal
//! operations cost nothing however many there are.
//!
//! When the worklist drains, materializations nobody uses anymore are erased
//! together with every helper operation they created, and every operation the
//! target still deems illegal is reported.

use std::collections::{HashMap, HashSet, VecDeque};

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::builder::OpBuilder;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{
    ConversionFailedSnafu, IterationLimitSnafu, MaterializationFailedSnafu, MaterializationKind,
    MissingReplacementSnafu, ReplacementAritySnafu, Result,
};
use crate::func::Func;
use crate::graph::{Checkpoint, Graph, OpId, ValueId};

use super::pattern::{ConversionPattern, RewriteResult};
use super::rewriter::ConversionRewriter;
use super::target::{ConversionTarget, Legality};
use super::type_converter::TypeConverter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Upper bound on legalization attempts before giving up.
    pub max_iterations: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self { max_iterations: 10_000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Operations replaced by a pattern.
    pub rewritten: usize,
    /// Materializations inserted by the driver.
    pub materializations: usize,
    /// Materializations erased again because nothing used them.
    pub erased_materializations: usize,
    /// Worklist pops.
    pub visited: usize,
    /// Illegal operations handed to the patterns.
    pub attempts: usize,
}

/// Rewrite every illegal operation of `func` with `patterns`.
///
/// Operations the target does not know about are left untouched. On error
/// the function may be partially converted; callers that need atomicity run
/// the conversion on a copy.
pub fn apply_partial_conversion(
    func: &mut Func,
    target: &ConversionTarget,
    converter: &TypeConverter,
    patterns: &[Box<dyn ConversionPattern>],
    config: &ConversionConfig,
) -> Result<ConversionStats> {
    let mut driver = Driver {
        graph: func.body_mut(),
        target,
        converter,
        patterns,
        mapping: HashMap::new(),
        materializations: Vec::new(),
        diagnostics: Diagnostics::new(),
        worklist: VecDeque::new(),
        queued: HashSet::new(),
        stats: ConversionStats::default(),
    };
    driver.run(config.max_iterations)?;
    Ok(driver.stats)
}

/// Operations a single materialization created, and the value it produced.
#[derive(Debug)]
struct Materialization {
    value: ValueId,
    ops: SmallVec<[OpId; 4]>,
}

/// Target materialization made for an operand during one rewrite attempt.
#[derive(Debug)]
struct Pending {
    original: ValueId,
    materialization: Materialization,
}

struct Driver<'a> {
    graph: &'a mut Graph,
    target: &'a ConversionTarget,
    converter: &'a TypeConverter,
    patterns: &'a [Box<dyn ConversionPattern>],
    /// Original value -> value of the converted type standing in for it.
    mapping: HashMap<ValueId, ValueId>,
    materializations: Vec<Materialization>,
    diagnostics: Diagnostics,
    worklist: VecDeque<OpId>,
    queued: HashSet<OpId>,
    stats: ConversionStats,
}

impl Driver<'_> {
    fn enqueue(&mut self, op: OpId) {
        if self.queued.insert(op) {
            self.worklist.push_back(op);
        }
    }

    fn run(&mut self, limit: usize) -> Result<()> {
        let initial: Vec<OpId> = self.graph.ops().to_vec();
        for op in initial {
            self.enqueue(op);
        }

        while let Some(op) = self.worklist.pop_front() {
            self.queued.remove(&op);
            if !self.graph.is_live(op) {
                continue;
            }
            self.stats.visited += 1;

            if self.target.legality(&*self.graph, op) == Legality::Illegal {
                ensure!(self.stats.attempts < limit, IterationLimitSnafu { limit });
                self.stats.attempts += 1;
                self.legalize(op)?;
            }
        }

        self.erase_dead_materializations()?;

        let illegal: Vec<OpId> =
            self.graph.ops().iter().copied().filter(|&op| self.target.is_illegal(&*self.graph, op)).collect();
        if !illegal.is_empty() {
            for &op in &illegal {
                let operation = self.graph.op(op);
                self.diagnostics.emit(Diagnostic::op_error(
                    operation.name(),
                    operation.location().clone(),
                    "failed to legalize operation",
                ));
            }
            return ConversionFailedSnafu { illegal: illegal.len(), diagnostics: std::mem::take(&mut self.diagnostics) }
                .fail();
        }

        tracing::debug!(
            rewritten = self.stats.rewritten,
            materializations = self.stats.materializations,
            erased = self.stats.erased_materializations,
            visited = self.stats.visited,
            attempts = self.stats.attempts,
            "partial conversion finished"
        );
        Ok(())
    }

    /// Try every pattern on `op`. Returns whether one of them rewrote it.
    fn legalize(&mut self, op: OpId) -> Result<bool> {
        let name = self.graph.op(op).name();

        for pattern in self.patterns {
            let checkpoint = self.graph.checkpoint();
            let Some((operands, pending)) = self.remap_operands(op)? else {
                self.graph.rollback(checkpoint);
                tracing::trace!(op = %name, id = %op, "operands have no converted form");
                return Ok(false);
            };

            let mut rewriter = ConversionRewriter::new(&mut *self.graph, op, self.converter, &mut self.diagnostics);
            let result = pattern.match_and_rewrite(op, &operands, &mut rewriter)?;
            let replacement = rewriter.take_replacement();

            match result {
                RewriteResult::Rewritten => {
                    let replacement =
                        replacement.context(MissingReplacementSnafu { pattern: pattern.name(), op: name })?;
                    self.commit(op, checkpoint, pending, &replacement)?;
                    tracing::debug!(pattern = pattern.name(), op = %name, id = %op, "pattern applied");
                    return Ok(true);
                }
                RewriteResult::NoMatch | RewriteResult::Failed => {
                    self.graph.rollback(checkpoint);
                    tracing::trace!(pattern = pattern.name(), op = %name, id = %op, %result, "pattern rolled back");
                }
            }
        }
        Ok(false)
    }

    /// Operands of `op` in their converted types, plus the target
    /// materializations created for them. `None` when some operand cannot be
    /// converted.
    ///
    /// A value already converted to a different type than the one wanted here
    /// is materialized from its converted form, not from the original.
    fn remap_operands(&mut self, op: OpId) -> Result<Option<(SmallVec<[ValueId; 4]>, Vec<Pending>)>> {
        let operands: SmallVec<[ValueId; 4]> = self.graph.op(op).operands().iter().copied().collect();
        let location = self.graph.op(op).location().clone();
        let mut remapped = SmallVec::with_capacity(operands.len());
        let mut pending: Vec<Pending> = Vec::new();

        for value in operands {
            let ty = self.graph.value_type(value).clone();
            let Some(converted) = self.converter.convert_type(&ty) else {
                return Ok(None);
            };
            if converted == ty {
                remapped.push(value);
                continue;
            }

            let known = self.mapping.get(&value).copied().or_else(|| {
                pending.iter().find(|p| p.original == value).map(|p| p.materialization.value)
            });
            let source = match known {
                Some(mapped) if self.graph.is_value_live(mapped) => {
                    if self.graph.value_type(mapped) == &converted {
                        remapped.push(mapped);
                        continue;
                    }
                    mapped
                }
                _ => value,
            };

            let checkpoint = self.graph.checkpoint();
            let mut b = OpBuilder::before(&mut *self.graph, op).with_location(location.clone());
            let Some(materialized) = self.converter.materialize_target(&mut b, &converted, &[source])? else {
                tracing::trace!(value = %source, to = %converted, "target materialization declined");
                return Ok(None);
            };
            let ops = self.graph.created_since(checkpoint).collect();
            pending.push(Pending { original: value, materialization: Materialization { value: materialized, ops } });
            remapped.push(materialized);
        }

        Ok(Some((remapped, pending)))
    }

    fn commit(
        &mut self,
        op: OpId,
        checkpoint: Checkpoint,
        pending: Vec<Pending>,
        replacement: &[ValueId],
    ) -> Result<()> {
        let operation = self.graph.op(op);
        let results: SmallVec<[ValueId; 2]> = operation.results().iter().copied().collect();
        let location = operation.location().clone();
        ensure!(
            results.len() == replacement.len(),
            ReplacementAritySnafu { op: operation.name(), expected: results.len(), actual: replacement.len() }
        );

        for Pending { original, materialization } in pending {
            let converted = materialization.value;
            self.record_materialization(materialization, original, converted);
        }

        for (&old, &new) in results.iter().zip(replacement) {
            if !self.graph.has_uses(old) {
                continue;
            }
            let users = self.graph.users(old);
            let old_ty = self.graph.value_type(old).clone();

            let bridged = if self.graph.value_type(new) == &old_ty {
                new
            } else {
                let before = self.graph.checkpoint();
                let mut b = OpBuilder::before(&mut *self.graph, op).with_location(location.clone());
                let bridged = self.converter.materialize_source(&mut b, &old_ty, &[new])?.context(
                    MaterializationFailedSnafu { kind: MaterializationKind::Source, value: old, to: old_ty.clone() },
                )?;
                let ops = self.graph.created_since(before).collect();
                self.record_materialization(Materialization { value: bridged, ops }, bridged, new);
                bridged
            };

            self.graph.replace_all_uses_with(old, bridged);
            for user in users {
                self.enqueue(user);
            }
        }

        let created: Vec<OpId> = self.graph.created_since(checkpoint).collect();
        self.graph.erase_op(op)?;
        for new_op in created {
            self.enqueue(new_op);
        }
        self.stats.rewritten += 1;
        Ok(())
    }

    /// Remember that `converted` stands in for `original` from now on.
    fn record_materialization(&mut self, materialization: Materialization, original: ValueId, converted: ValueId) {
        self.materializations.push(materialization);
        self.mapping.insert(original, converted);
        self.stats.materializations += 1;
    }

    /// Erase materializations whose value has no users, along with the
    /// helper operations they created. Repeats until nothing changes, since
    /// erasing one materialization can leave another without users.
    fn erase_dead_materializations(&mut self) -> Result<()> {
        let mut materializations = std::mem::take(&mut self.materializations);
        loop {
            let before = materializations.len();
            let mut kept = Vec::with_capacity(before);
            for materialization in materializations.into_iter().rev() {
                if !self.graph.is_value_live(materialization.value) {
                    continue;
                }
                if self.graph.has_uses(materialization.value) {
                    kept.push(materialization);
                    continue;
                }
                for &op in materialization.ops.iter().rev() {
                    if self.graph.is_live(op) {
                        self.graph.erase_op(op)?;
                    }
                }
                self.stats.erased_materializations += 1;
            }
            kept.reverse();
            materializations = kept;
            if materializations.len() == before {
                return Ok(());
            }
        }
    }
}
