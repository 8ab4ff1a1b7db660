use test_case::test_case;
use tmir_ir::dialect::memref;
use tmir_ir::{Attribute, Func, RankedType, Type};

use crate::cast::{cast_or_realloc, is_guaranteed_cast_compatible};
use crate::test::helpers::{count, ty};

fn ranked(text: &str) -> RankedType {
    ty(text).as_ranked().cloned().expect("ranked type")
}

#[test_case("memref<4x8xf32>", "memref<4x8xf32>" => true; "identical")]
#[test_case("memref<4x8xf32>", "memref<?x8xf32>" => true; "erase static")]
#[test_case("memref<4x8xf32>", "memref<?x?xf32>" => true; "fully dynamic")]
#[test_case("memref<?x8xf32>", "memref<4x8xf32>" => false; "refine dynamic")]
#[test_case("memref<4x8xf32>", "memref<4x8xf16>" => false; "element type")]
#[test_case("memref<4xf32>", "memref<4x1xf32>" => false; "rank")]
fn test_guaranteed_cast_compatible(from: &str, to: &str) -> bool {
    is_guaranteed_cast_compatible(&ranked(from), &ranked(to))
}

#[test]
fn test_cast_keeps_storage() {
    let mut f = Func::new("c", [ty("memref<4x8xf32>")]);
    let arg = f.argument(0);
    let cast = cast_or_realloc(&mut f.builder(), arg, &ranked("memref<?x8xf32>"), None).unwrap().unwrap();

    let op = f.body().op(f.body().defining_op(cast).unwrap());
    assert!(op.is_a(memref::CAST));
    assert_eq!(op.operands(), &[arg]);
    assert_eq!(count(&f, memref::ALLOC), 0);
}

#[test]
fn test_realloc_reads_dynamic_extents_from_source() {
    let mut f = Func::new("c", [ty("memref<?x?xf32>")]);
    let arg = f.argument(0);
    let buffer = cast_or_realloc(&mut f.builder(), arg, &ranked("memref<3x?xf32>"), None).unwrap().unwrap();

    let body = f.body();
    let alloc = body.op(body.defining_op(buffer).unwrap());
    assert!(alloc.is_a(memref::ALLOC));
    assert_eq!(alloc.num_operands(), 1);
    let extent = body.op(body.defining_op(alloc.operand(0)).unwrap());
    assert!(extent.is_a(memref::DIM));
    assert_eq!(extent.operand(0), arg);
    assert_eq!(count(&f, memref::COPY), 1);
}

#[test_case(None => None; "unspecified")]
#[test_case(Some(64) => Some(64); "explicit")]
fn test_realloc_alignment(alignment: Option<u64>) -> Option<i64> {
    let mut f = Func::new("c", [ty("memref<?xf32>")]);
    let arg = f.argument(0);
    let buffer = cast_or_realloc(&mut f.builder(), arg, &ranked("memref<4xf32>"), alignment).unwrap().unwrap();
    let alloc = f.body().op(f.body().defining_op(buffer).unwrap());
    alloc.attr(memref::ALIGNMENT).and_then(Attribute::as_int)
}

#[test]
fn test_non_buffer_source_declines() {
    let mut f = Func::new("c", [ty("tensor<4xf32>")]);
    let arg = f.argument(0);
    assert_eq!(cast_or_realloc(&mut f.builder(), arg, &ranked("memref<4xf32>"), None).unwrap(), None);
    assert!(f.body().ops().is_empty());
    assert!(matches!(f.body().value_type(arg), Type::RankedTensor(_)));
}
