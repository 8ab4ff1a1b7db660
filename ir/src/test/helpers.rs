//! Shared fixtures for IR tests.
//!
//! The `test` dialect used here has a single unary op, `test.negate`, with
//! the usual destination-style bufferized form `test.negate(%in, %out)`.

use std::rc::Rc;

use crate::builder::OpBuilder;
use crate::conversion::{ConversionPattern, ConversionRewriter, ConversionTarget, RewriteResult, TypeConverter};
use crate::dialect::{bufferization, memref};
use crate::error::{MaterializationKind, MaterializationInputSnafu, Result};
use crate::graph::{OpId, OpName, OperationState, ValueId};
use crate::types::Type;

pub const TEST_DIALECT: &str = "test";
pub const NEGATE: OpName = OpName::new(TEST_DIALECT, "negate");

/// Parse a type, panicking on malformed input.
pub fn ty(text: &str) -> Type {
    text.parse().unwrap_or_else(|e| panic!("bad test type {text:?}: {e}"))
}

pub fn negate(b: &mut OpBuilder<'_>, input: ValueId) -> ValueId {
    let ty = b.value_type(input).clone();
    b.create_value(OperationState::new(NEGATE).operand(input).result(ty))
}

/// Ranked tensors become memrefs, everything else stays as is.
pub fn tensor_to_memref_converter() -> TypeConverter {
    let mut converter = TypeConverter::new();
    converter.add_conversion(|ty| Some(ty.clone()));
    converter.add_conversion(|ty| match ty {
        Type::RankedTensor(ranked) => Some(Type::MemRef(ranked.clone())),
        _ => None,
    });
    converter.add_source_materialization(|b, ty, inputs| {
        Ok(Some(bufferization::to_tensor(b, ty.clone(), inputs[0])))
    });
    converter.add_target_materialization(|b, ty, inputs| {
        let from = b.value_type(inputs[0]).clone();
        snafu::ensure!(
            from.is_tensor(),
            MaterializationInputSnafu { kind: MaterializationKind::Target, from, to: ty.clone() }
        );
        Ok(Some(bufferization::to_buffer(b, ty.clone(), inputs[0])))
    });
    converter
}

/// Target with `memref`, `bufferization` and `func` legal and the `test`
/// dialect legal once its types are converted.
pub fn test_target(converter: &Rc<TypeConverter>) -> ConversionTarget {
    let mut target = ConversionTarget::new();
    target.add_legal_dialects([memref::DIALECT, bufferization::DIALECT, crate::dialect::func::DIALECT]);
    let converter = Rc::clone(converter);
    target.add_dynamically_legal_dialect(TEST_DIALECT, move |graph, op| converter.is_legal_op(graph, op));
    target
}

/// Rewrites `test.negate` into its destination-style buffer form. Ops
/// carrying a `fail` attribute are refused with a diagnostic.
pub struct BufferizeNegate;

impl ConversionPattern for BufferizeNegate {
    fn name(&self) -> &str {
        "bufferize-negate"
    }

    fn match_and_rewrite(
        &self,
        op: OpId,
        operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> Result<RewriteResult> {
        if !rewriter.op().is_a(NEGATE) {
            return Ok(RewriteResult::NoMatch);
        }
        if rewriter.op().attr("fail").is_some() {
            rewriter.emit_error("refusing to bufferize");
            return Ok(RewriteResult::Failed);
        }
        let result = rewriter.op().result(0);
        let Type::RankedTensor(ranked) = rewriter.graph().value_type(result).clone() else {
            return Ok(RewriteResult::NoMatch);
        };

        let mut b = rewriter.builder();
        let output = memref::alloc(&mut b, ranked, &[], None)?;
        b.clone_op(op, [operands[0], output], std::iter::empty());
        rewriter.replace_op([output]);
        Ok(RewriteResult::Rewritten)
    }
}

/// Allocates a buffer and then gives up, leaving the cleanup to the driver.
pub struct AllocThenBail;

impl ConversionPattern for AllocThenBail {
    fn name(&self) -> &str {
        "alloc-then-bail"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        _operands: &[ValueId],
        rewriter: &mut ConversionRewriter<'_>,
    ) -> Result<RewriteResult> {
        let mut b = rewriter.builder();
        memref::alloc(&mut b, crate::types::RankedType::new([4usize], crate::DType::Float32), &[], None)?;
        Ok(RewriteResult::NoMatch)
    }
}

/// Claims success without replacing anything.
pub struct ForgetfulPattern;

impl ConversionPattern for ForgetfulPattern {
    fn name(&self) -> &str {
        "forgetful"
    }

    fn match_and_rewrite(
        &self,
        _op: OpId,
        _operands: &[ValueId],
        _rewriter: &mut ConversionRewriter<'_>,
    ) -> Result<RewriteResult> {
        Ok(RewriteResult::Rewritten)
    }
}
