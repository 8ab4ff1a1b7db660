use test_case::test_case;

use crate::attribute::Attribute;
use crate::dialect::memref::{self, MixedSize};
use crate::dialect::{arith, tensor};
use crate::error::Error;
use crate::func::Func;
use crate::graph::OpName;
use crate::test::helpers::ty;

#[test_case("memref<?x3xf32>", memref::DIM; "buffer")]
#[test_case("tensor<?x3xf32>", tensor::DIM; "tensor")]
fn test_mixed_sizes_query_dynamic_extents(value_ty: &str, query: OpName) {
    let mut f = Func::new("f", [ty(value_ty)]);
    let arg = f.argument(0);
    let sizes = memref::mixed_sizes(&mut f.builder(), arg).unwrap();

    let [MixedSize::Dynamic(extent), MixedSize::Static(3)] = sizes.as_slice() else {
        panic!("unexpected sizes {sizes:?}");
    };
    let graph = f.body();
    let dim = graph.op(graph.defining_op(*extent).unwrap());
    assert!(dim.is_a(query));
    assert_eq!(dim.operand(0), arg);

    let index = graph.op(graph.defining_op(dim.operand(1)).unwrap());
    assert!(index.is_a(arith::CONSTANT));
    assert_eq!(index.attr(arith::VALUE), Some(&Attribute::Int(0)));
}

#[test]
fn test_mixed_sizes_of_static_shape_create_nothing() {
    let mut f = Func::new("f", [ty("memref<2x3xf32>")]);
    let arg = f.argument(0);
    let sizes = memref::mixed_sizes(&mut f.builder(), arg).unwrap();

    assert_eq!(sizes.as_slice(), &[MixedSize::Static(2), MixedSize::Static(3)]);
    assert_eq!(f.body().num_ops(), 0);
}

#[test]
fn test_mixed_sizes_feed_alloc() {
    let mut f = Func::new("f", [ty("memref<4x?xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    let sizes = memref::mixed_sizes(&mut b, arg).unwrap();
    let buffer = memref::alloc_mixed(&mut b, &sizes, crate::DType::Float32);

    assert_eq!(f.body().value_type(buffer), &ty("memref<4x?xf32>"));
    assert_eq!(f.body().ops_named(memref::DIM).count(), 1);
}

#[test]
fn test_mixed_sizes_require_rank() {
    let mut f = Func::new("f", [ty("memref<*xf32>")]);
    let arg = f.argument(0);
    let err = memref::mixed_sizes(&mut f.builder(), arg).unwrap_err();
    assert!(matches!(err, Error::NotRanked { value, .. } if value == arg));
}
