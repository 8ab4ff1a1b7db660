//! Generic textual form of functions and operations.
//!
//! ```text
//! func.func @copy(%0: memref<4xf32>) {
//!   %1 = "memref.alloc"() {alignment = 64} : () -> memref<4xf32>
//!   "memref.copy"(%0, %1) : (memref<4xf32>, memref<4xf32>) -> ()
//!   "func.return"(%1) : (memref<4xf32>) -> ()
//! }
//! ```

use std::fmt;

use crate::func::Func;
use crate::graph::{Graph, OpId, ValueId};

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write(f, item)?;
    }
    Ok(())
}

/// Display adapter for a single operation.
pub struct OpDisplay<'a> {
    graph: &'a Graph,
    op: OpId,
}

impl Graph {
    pub fn display_op(&self, op: OpId) -> OpDisplay<'_> {
        OpDisplay { graph: self, op }
    }
}

impl fmt::Display for OpDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.graph.op(self.op);
        let write_type = |f: &mut fmt::Formatter<'_>, v: &ValueId| write!(f, "{}", self.graph.value_type(*v));

        if op.num_results() > 0 {
            write_list(f, op.results(), |f, v| write!(f, "{v}"))?;
            f.write_str(" = ")?;
        }
        write!(f, "\"{}\"(", op.name())?;
        write_list(f, op.operands(), |f, v| write!(f, "{v}"))?;
        f.write_str(")")?;

        if !op.attributes().is_empty() {
            let attrs: Vec<_> = op.attributes().iter().collect();
            f.write_str(" {")?;
            write_list(f, &attrs, |f, (name, value)| write!(f, "{name} = {value}"))?;
            f.write_str("}")?;
        }

        f.write_str(" : (")?;
        write_list(f, op.operands(), write_type)?;
        f.write_str(") -> ")?;
        if op.num_results() == 1 {
            write_type(f, &op.result(0))
        } else {
            f.write_str("(")?;
            write_list(f, op.results(), write_type)?;
            f.write_str(")")
        }
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body();
        write!(f, "func.func @{}(", self.name())?;
        write_list(f, self.arguments(), |f, v| write!(f, "{v}: {}", body.value_type(*v)))?;
        f.write_str(") {\n")?;
        for &op in body.ops() {
            writeln!(f, "  {}", body.display_op(op))?;
        }
        f.write_str("}")
    }
}
