//! Straight-line interpreter over [`Func`] bodies.
//!
//! Tensors and buffers share the same host representation ([`Array`]); what
//! differs is who owns the storage. Tensor-semantic tensor-algebra ops copy
//! their outputs before computing, so the operands stay untouched.
//! Buffer-semantic ones write through their outputs. `to_tensor`,
//! `to_buffer` and `memref.cast` produce views of the same storage, which is
//! what makes aliasing bugs in a bufferized function observable.

use std::collections::HashMap;

use snafu::{OptionExt, ensure};
use tmir_ir::dialect::{arith, bufferization, func, memref, tensor, tm_tensor};
use tmir_ir::interfaces::segment_sizes;
use tmir_ir::{Dim, Func, OpName, Operation, Type, ValueId};

use crate::buffer::{Array, Extents};
use crate::error::{
    ArgumentCountSnafu, IndexOutOfBoundsSnafu, MissingAttributeSnafu, OperandCountSnafu, OperandKindSnafu, Result,
    ShapeMismatchSnafu, UnboundValueSnafu, UnsupportedOpSnafu,
};
use crate::kernels;

/// Runtime value bound to an SSA value.
#[derive(Debug, Clone)]
pub enum Value {
    Index(usize),
    Scalar(f64),
    Array(Array),
}

impl Value {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

/// Run `func` on `args` and return the operands of its `func.return`.
///
/// Array arguments are bound by reference: a function that writes through a
/// buffer argument (or through a `to_buffer` of a tensor argument) mutates
/// the caller's storage.
#[tracing::instrument(skip_all, fields(func = func.name()))]
pub fn execute(func: &Func, args: &[Value]) -> Result<Vec<Value>> {
    ensure!(
        args.len() == func.arguments().len(),
        ArgumentCountSnafu { func: func.name(), expected: func.arguments().len(), actual: args.len() }
    );

    let mut frame = Frame::default();
    for (&param, arg) in func.arguments().iter().zip(args) {
        frame.bind(param, arg.clone());
    }

    let body = func.body();
    for &id in body.ops() {
        let op = body.op(id);
        tracing::trace!(op = %op.name(), id = %id, "execute");

        if op.is_a(func::RETURN) {
            let values = op.operands().iter().map(|&v| frame.get(v).cloned()).collect::<Result<Vec<_>>>()?;
            tracing::debug!(results = values.len(), "function returned");
            return Ok(values);
        }

        let results = frame.step(op, |v| body.value_type(v))?;
        for (&value, result) in op.results().iter().zip(results) {
            frame.bind(value, result);
        }
    }

    tracing::debug!("function fell off the end without a return");
    Ok(Vec::new())
}

#[derive(Default)]
struct Frame {
    values: HashMap<ValueId, Value>,
}

impl Frame {
    fn bind(&mut self, value: ValueId, runtime: Value) {
        self.values.insert(value, runtime);
    }

    fn get(&self, value: ValueId) -> Result<&Value> {
        self.values.get(&value).context(UnboundValueSnafu { value })
    }

    fn array(&self, op: &Operation, value: ValueId) -> Result<&Array> {
        self.get(value)?.as_array().context(OperandKindSnafu { op: op.name(), value, expected: "an array" })
    }

    fn index(&self, op: &Operation, value: ValueId) -> Result<usize> {
        self.get(value)?.as_index().context(OperandKindSnafu { op: op.name(), value, expected: "an index" })
    }

    fn arrays(&self, op: &Operation, values: &[ValueId]) -> Result<Vec<Array>> {
        values.iter().map(|&v| self.array(op, v).cloned()).collect()
    }

    /// Evaluate one operation, returning its results in order.
    fn step<'t>(&self, op: &Operation, type_of: impl Fn(ValueId) -> &'t Type) -> Result<Vec<Value>> {
        let name = op.name();

        if name == arith::CONSTANT {
            let attr = op.attr(arith::VALUE).context(MissingAttributeSnafu { op: name, name: arith::VALUE })?;
            let value = match type_of(op.result(0)) {
                Type::Index => attr.as_int().and_then(|v| usize::try_from(v).ok()).map(Value::Index),
                _ => attr.as_float().map(Value::Scalar),
            };
            return Ok(vec![value.context(MissingAttributeSnafu { op: name, name: arith::VALUE })?]);
        }

        if name == tensor::EMPTY || name == memref::ALLOC {
            let shape = self.resolve_shape(op, type_of(op.result(0)))?;
            return Ok(vec![Array::uninit(&shape).into()]);
        }

        if name == tensor::DIM || name == memref::DIM {
            expect_operands(op, 2)?;
            let array = self.array(op, op.operand(0))?;
            let index = self.index(op, op.operand(1))?;
            let bounds = IndexOutOfBoundsSnafu { op: name, index, extent: array.rank() };
            let extent = array.shape().get(index).copied().context(bounds)?;
            return Ok(vec![Value::Index(extent)]);
        }

        if name == memref::COPY {
            expect_operands(op, 2)?;
            let source = self.array(op, op.operand(0))?;
            let target = self.array(op, op.operand(1))?;
            ensure!(
                source.shape() == target.shape(),
                ShapeMismatchSnafu { op: name, expected: target.shape().to_vec(), actual: source.shape().to_vec() }
            );
            target.copy_from(source);
            return Ok(Vec::new());
        }

        if name == memref::CAST || name == bufferization::TO_TENSOR || name == bufferization::TO_BUFFER {
            expect_operands(op, 1)?;
            let view = self.array(op, op.operand(0))?.clone();
            check_static_dims(name, &view, type_of(op.result(0)))?;
            return Ok(vec![view.into()]);
        }

        if name.dialect() == tm_tensor::DIALECT {
            return self.tensor_algebra(op);
        }

        UnsupportedOpSnafu { op: name }.fail()
    }

    /// Concrete extents of `ty`, taking dynamic extents from the index
    /// operands of `op` in order.
    fn resolve_shape(&self, op: &Operation, ty: &Type) -> Result<Extents> {
        let ranked = ty.as_ranked().context(UnsupportedOpSnafu { op: op.name() })?;
        expect_operands(op, ranked.num_dynamic_dims())?;

        let mut dynamic = op.operands().iter();
        let mut shape = Extents::with_capacity(ranked.rank());
        for dim in ranked.shape() {
            let extent = match dim {
                Dim::Static(n) => *n,
                Dim::Dynamic => {
                    let &value = dynamic.next().context(OperandCountSnafu {
                        op: op.name(),
                        expected: ranked.num_dynamic_dims(),
                        actual: op.num_operands(),
                    })?;
                    self.index(op, value)?
                }
            };
            shape.push(extent);
        }
        Ok(shape)
    }

    fn tensor_algebra(&self, op: &Operation) -> Result<Vec<Value>> {
        let name = op.name();
        let (num_inputs, num_outputs) = segment_sizes(op);
        expect_operands(op, num_inputs + num_outputs)?;
        let inputs = self.arrays(op, &op.operands()[..num_inputs])?;
        let given = self.arrays(op, &op.operands()[num_inputs..num_inputs + num_outputs])?;

        let tensor_semantics = op.num_results() > 0;
        let outputs: Vec<Array> =
            if tensor_semantics { given.iter().map(Array::deep_clone).collect() } else { given };

        let dim = tm_tensor::dimension(op);
        if name == tm_tensor::SCAN {
            let ([input], [output, accumulator]) = (slots::<1>(op, &inputs)?, slots::<2>(op, &outputs)?);
            kernels::scan(input, output, accumulator, dim, tm_tensor::is_inclusive(op))?;
        } else if name == tm_tensor::SCATTER {
            let ([updates, indices], [original]) = (slots::<2>(op, &inputs)?, slots::<1>(op, &outputs)?);
            kernels::scatter(updates, indices, original, tm_tensor::combiner(op))?;
        } else if name == tm_tensor::SORT {
            kernels::sort(&outputs, dim, tm_tensor::is_descending(op))?;
        } else if name == tm_tensor::TOPK {
            let ([values], [out_values, out_indices]) = (slots::<1>(op, &inputs)?, slots::<2>(op, &outputs)?);
            kernels::topk(values, out_values, out_indices, dim)?;
        } else if name == tm_tensor::ATTENTION {
            let ([query, key, value], [output]) = (slots::<3>(op, &inputs)?, slots::<1>(op, &outputs)?);
            kernels::attention(query, key, value, output)?;
        } else {
            return UnsupportedOpSnafu { op: name }.fail();
        }

        tracing::debug!(op = %name, tensor_semantics, "tensor-algebra op evaluated");
        if tensor_semantics { Ok(outputs.into_iter().map(Value::Array).collect()) } else { Ok(Vec::new()) }
    }
}

fn expect_operands(op: &Operation, expected: usize) -> Result<()> {
    ensure!(op.num_operands() >= expected, OperandCountSnafu { op: op.name(), expected, actual: op.num_operands() });
    Ok(())
}

fn slots<'a, const N: usize>(op: &Operation, arrays: &'a [Array]) -> Result<[&'a Array; N]> {
    ensure!(arrays.len() >= N, OperandCountSnafu { op: op.name(), expected: N, actual: arrays.len() });
    Ok(std::array::from_fn(|i| &arrays[i]))
}

/// A view must agree with every static extent of its declared type.
fn check_static_dims(op: OpName, view: &Array, ty: &Type) -> Result<()> {
    let Some(ranked) = ty.as_ranked() else {
        return Ok(());
    };
    let consistent = ranked.rank() == view.rank()
        && ranked.shape().iter().zip(view.shape()).all(|(dim, &n)| dim.as_static().is_none_or(|s| s == n));
    ensure!(
        consistent,
        ShapeMismatchSnafu {
            op,
            expected: ranked.shape().iter().map(|d| d.as_static().unwrap_or(0)).collect::<Vec<_>>(),
            actual: view.shape().to_vec(),
        }
    );
    Ok(())
}

/// Convenience for tests and callers building arguments by hand.
pub fn array(shape: &[usize], data: impl Into<Vec<f64>>) -> Result<Value> {
    Ok(Array::from_vec(shape, data.into())?.into())
}

