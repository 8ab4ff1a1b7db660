use tmir_ir::dialect::{arith, bufferization, func, memref, tm_tensor};
use tmir_ir::{DType, Dim, Func, OpName, OperationState, RankedType, Type};

use crate::buffer::Array;
use crate::error::Error;
use crate::interpreter::{Value, array, execute};

fn ty(text: &str) -> Type {
    text.parse().unwrap_or_else(|e| panic!("bad test type {text:?}: {e}"))
}

fn arrays(values: &[Value]) -> Vec<Array> {
    values.iter().map(|v| v.as_array().expect("array result").clone()).collect()
}

/// `scan(%input) outs(%output, %acc)` along dimension 1 with the given
/// operand types, returning the op's results.
fn scan_func(input: &str, output: &str, acc: &str) -> Func {
    let mut f = Func::new("scan", [ty(input), ty(output), ty(acc)]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let op = tm_tensor::scan(&mut b, input, output, acc, 1, true);
    let results = b.op(op).results().to_vec();
    func::return_(&mut b, results);
    f
}

#[test]
#[tracing_test::traced_test]
fn test_tensor_semantics_leave_operands_untouched() {
    let f = scan_func("tensor<2x3xf32>", "tensor<2x3xf32>", "tensor<2xf32>");
    let input = array(&[2, 3], [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let output = array(&[2, 3], [0.0; 6]).unwrap();
    let acc = array(&[2], [10.0, 20.0]).unwrap();

    let results = arrays(&execute(&f, &[input.clone(), output.clone(), acc.clone()]).unwrap());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].to_vec(), vec![11.0, 13.0, 16.0, 24.0, 29.0, 35.0]);
    assert_eq!(results[1].to_vec(), vec![16.0, 35.0]);

    assert_eq!(output.as_array().unwrap().to_vec(), vec![0.0; 6]);
    assert_eq!(acc.as_array().unwrap().to_vec(), vec![10.0, 20.0]);
    assert!(!results[1].aliases(acc.as_array().unwrap()));
    assert!(logs_contain("tensor-algebra op evaluated"));
}

#[test]
fn test_buffer_semantics_write_in_place() {
    let f = scan_func("memref<2x3xf32>", "memref<2x3xf32>", "memref<2xf32>");
    let output = array(&[2, 3], [0.0; 6]).unwrap();
    let acc = array(&[2], [0.0, 0.0]).unwrap();
    let input = array(&[2, 3], [1.0; 6]).unwrap();

    let results = execute(&f, &[input, output.clone(), acc.clone()]).unwrap();
    assert!(results.is_empty());
    assert_eq!(output.as_array().unwrap().to_vec(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    assert_eq!(acc.as_array().unwrap().to_vec(), vec![3.0, 3.0]);
}

#[test]
fn test_to_buffer_aliases_the_tensor() {
    let mut f = Func::new("sort_through_view", [ty("tensor<3xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    let view = bufferization::to_buffer(&mut b, ty("memref<3xf32>"), arg);
    tm_tensor::sort(&mut b, &[view], 0, false);
    func::return_(&mut b, []);

    let tensor = array(&[3], [3.0, 1.0, 2.0]).unwrap();
    execute(&f, std::slice::from_ref(&tensor)).unwrap();
    assert_eq!(tensor.as_array().unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_dynamic_alloc_and_copy() {
    let mut f = Func::new("clone", [ty("memref<?x2xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    let extent = memref::dim(&mut b, arg, 0);
    let fresh = memref::alloc(&mut b, RankedType::new([Dim::Dynamic, Dim::Static(2)], DType::Float32), &[extent], None)
        .unwrap();
    memref::copy(&mut b, arg, fresh);
    func::return_(&mut b, [fresh, extent]);

    let source = array(&[3, 2], [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let results = execute(&f, std::slice::from_ref(&source)).unwrap();
    let copy = results[0].as_array().unwrap();
    assert_eq!(copy.shape(), &[3, 2]);
    assert_eq!(copy.to_vec(), source.as_array().unwrap().to_vec());
    assert!(!copy.aliases(source.as_array().unwrap()));
    assert_eq!(results[1].as_index(), Some(3));
}

#[test]
fn test_constants() {
    let mut f = Func::new("constants", []);
    let mut b = f.builder();
    let index = arith::constant_index(&mut b, 7);
    let scalar = arith::constant_float(&mut b, 0.5, DType::Float32);
    let offset = arith::constant_of(&mut b, -3i64);
    func::return_(&mut b, [index, scalar, offset]);

    assert_eq!(f.body().value_type(offset), &Type::Scalar(DType::Int64));
    let results = execute(&f, &[]).unwrap();
    assert_eq!(results[0].as_index(), Some(7));
    assert_eq!(results[1].as_scalar(), Some(0.5));
    assert_eq!(results[2].as_scalar(), Some(-3.0));
}

#[test]
fn test_cast_checks_static_dims() {
    let mut f = Func::new("bad_cast", [ty("memref<?xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    let cast = memref::cast(&mut b, arg, ty("memref<4xf32>"));
    func::return_(&mut b, [cast]);

    let err = execute(&f, &[array(&[3], [0.0; 3]).unwrap()]).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }));
}

#[test]
fn test_argument_count() {
    let f = scan_func("tensor<2x3xf32>", "tensor<2x3xf32>", "tensor<2xf32>");
    let err = execute(&f, &[]).unwrap_err();
    assert!(matches!(err, Error::ArgumentCount { expected: 3, actual: 0, .. }));
}

#[test]
fn test_unknown_op() {
    const MYSTERY: OpName = OpName::new("test", "mystery");
    let mut f = Func::new("mystery", []);
    let mut b = f.builder();
    b.create(OperationState::new(MYSTERY));

    let err = execute(&f, &[]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOp { op } if op == MYSTERY));
}
