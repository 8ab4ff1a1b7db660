use crate::builder::OpBuilder;
use crate::dialect::{arith, func, tm_tensor};
use crate::error::Error;
use crate::func::Func;
use crate::graph::{InsertPoint, OperationState};
use crate::interfaces::InterfaceRegistry;
use crate::test::helpers::{NEGATE, ty};
use crate::verifier::verify;

fn registry() -> InterfaceRegistry {
    InterfaceRegistry::with_builtin_dialects()
}

fn verification_message(err: Error) -> String {
    match err {
        Error::Verification { message, .. } => message,
        other => panic!("expected a verification error, got {other}"),
    }
}

#[test]
fn test_tensor_semantics_ok() {
    let mut f = Func::new("scan", [ty("tensor<8xf32>"), ty("tensor<8xf32>"), ty("tensor<f32>")]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let op = tm_tensor::scan(&mut b, input, output, acc, 0, true);
    let result = b.op(op).result(0);
    func::return_(&mut b, [result]);

    verify(&f, &registry()).unwrap();
}

#[test]
fn test_buffer_semantics_ok() {
    let mut f = Func::new("topk", [ty("memref<4x8xf32>"), ty("memref<4x2xf32>"), ty("memref<4x2xi64>")]);
    let (values, out_values, out_indices) = (f.argument(0), f.argument(1), f.argument(2));
    let op = tm_tensor::topk(&mut f.builder(), values, out_values, out_indices, 1);

    assert_eq!(f.body().op(op).num_results(), 0);
    verify(&f, &registry()).unwrap();
}

#[test]
fn test_mixed_outputs_rejected() {
    let mut f = Func::new("scan", [ty("tensor<8xf32>"), ty("tensor<8xf32>"), ty("memref<f32>")]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    tm_tensor::scan(&mut f.builder(), input, output, acc, 0, true);

    let message = verification_message(verify(&f, &registry()).unwrap_err());
    assert!(message.contains("buffer outputs"), "{message}");
}

#[test]
fn test_use_before_def_rejected() {
    let mut f = Func::new("f", []);
    let constant = arith::constant_index(&mut f.builder(), 4);
    let constant_op = f.body().defining_op(constant).unwrap();
    OpBuilder::before(f.body_mut(), constant_op)
        .create(OperationState::new(NEGATE).operand(constant).result(crate::types::Type::Index));

    let message = verification_message(verify(&f, &registry()).unwrap_err());
    assert!(message.contains("before its definition"), "{message}");
}

#[test]
fn test_result_type_mismatch_rejected() {
    let mut f = Func::new("sort", [ty("tensor<8xf32>")]);
    let keys = f.argument(0);
    f.body_mut().insert(
        InsertPoint::End,
        OperationState::new(tm_tensor::SORT).operand(keys).result(ty("tensor<?xf32>")),
        &Default::default(),
    );

    let message = verification_message(verify(&f, &registry()).unwrap_err());
    assert!(message.contains("differs from tied output"), "{message}");
}

#[test]
fn test_unregistered_ops_only_checked_structurally() {
    let mut f = Func::new("sort", [ty("tensor<8xf32>")]);
    let keys = f.argument(0);
    tm_tensor::sort(&mut f.builder(), &[keys], 0, false);

    verify(&f, &InterfaceRegistry::new()).unwrap();
}
