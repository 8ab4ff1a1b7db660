//! Structural checks on functions.

use std::collections::HashSet;

use snafu::ensure;

use crate::error::{Result, VerificationSnafu};
use crate::func::Func;
use crate::graph::{ValueDef, ValueId};
use crate::interfaces::{InterfaceRegistry, has_buffer_semantics, has_tensor_semantics};

/// Verify a function:
///
/// - every operand is a live value defined before its first use,
/// - every result records the operation and position that define it,
/// - registered tensor-algebra ops have consistent operand segments and are
///   either fully tensor-semantic (outputs tied to results of the same type)
///   or fully buffer-semantic (no results, buffer outputs).
pub fn verify(func: &Func, registry: &InterfaceRegistry) -> Result<()> {
    let graph = func.body();
    let mut defined: HashSet<ValueId> = graph.arguments().iter().copied().collect();

    for &op in graph.ops() {
        let operation = graph.op(op);
        let name = operation.name();

        for &operand in operation.operands() {
            ensure!(
                graph.is_value_live(operand),
                VerificationSnafu { op: name, message: format!("operand {operand} refers to an erased operation") }
            );
            ensure!(
                defined.contains(&operand),
                VerificationSnafu { op: name, message: format!("operand {operand} is used before its definition") }
            );
        }

        for (index, &result) in operation.results().iter().enumerate() {
            ensure!(
                graph.value_def(result) == ValueDef::OpResult { op, index },
                VerificationSnafu { op: name, message: format!("result {result} is not owned by this operation") }
            );
            defined.insert(result);
        }

        let Some(iface) = registry.tensor_algebra(name) else {
            continue;
        };

        let (inputs, outputs) = (iface.num_inputs(operation), iface.num_outputs(operation));
        ensure!(
            inputs + outputs == operation.num_operands(),
            VerificationSnafu {
                op: name,
                message: format!(
                    "operand segments [{inputs}, {outputs}] do not cover {} operand(s)",
                    operation.num_operands()
                ),
            }
        );

        if operation.num_results() > 0 {
            ensure!(
                has_tensor_semantics(graph, iface, op),
                VerificationSnafu { op: name, message: "expected one tensor output per result".to_string() }
            );
            for (&output, &result) in iface.outputs(operation).iter().zip(operation.results()) {
                ensure!(
                    graph.value_type(output) == graph.value_type(result),
                    VerificationSnafu {
                        op: name,
                        message: format!(
                            "result type {} differs from tied output type {}",
                            graph.value_type(result),
                            graph.value_type(output)
                        ),
                    }
                );
            }
        } else {
            ensure!(
                has_buffer_semantics(graph, iface, op),
                VerificationSnafu { op: name, message: "result-less op expects buffer outputs".to_string() }
            );
        }
    }

    Ok(())
}
