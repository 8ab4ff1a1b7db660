use crate::builder::OpBuilder;
use crate::dialect::{arith, func};
use crate::error::Error;
use crate::func::Func;
use crate::graph::{InsertPoint, OperationState, ValueDef};
use crate::test::helpers::{NEGATE, negate, ty};

#[test]
fn test_insert_before_keeps_creation_order() {
    let mut f = Func::new("f", [ty("tensor<4xf32>")]);
    let arg = f.argument(0);
    let ret = func::return_(&mut f.builder(), [arg]);

    let mut b = OpBuilder::before(f.body_mut(), ret);
    let first = arith::constant_index(&mut b, 1);
    let second = arith::constant_index(&mut b, 2);

    let graph = f.body();
    let order: Vec<_> = graph.ops().to_vec();
    assert_eq!(order.len(), 3);
    assert_eq!(graph.defining_op(first), Some(order[0]));
    assert_eq!(graph.defining_op(second), Some(order[1]));
    assert_eq!(order[2], ret);
    assert_eq!(f.terminator(), Some(ret));
}

#[test]
fn test_value_defs() {
    let mut f = Func::new("f", [ty("tensor<4xf32>"), ty("tensor<4xf32>")]);
    let arg1 = f.argument(1);
    let neg = negate(&mut f.builder(), arg1);

    let graph = f.body();
    assert_eq!(graph.value_def(arg1), ValueDef::Argument(1));
    let op = graph.defining_op(neg).unwrap();
    assert_eq!(graph.value_def(neg), ValueDef::OpResult { op, index: 0 });
    assert!(graph.op(op).is_a(NEGATE));
}

#[test]
fn test_replace_all_uses() {
    let mut f = Func::new("f", [ty("tensor<4xf32>"), ty("tensor<4xf32>")]);
    let (a, b) = (f.argument(0), f.argument(1));
    let mut builder = f.builder();
    let n1 = negate(&mut builder, a);
    let n2 = negate(&mut builder, a);
    let ret = func::return_(&mut builder, [a, n1, n2]);

    let graph = f.body_mut();
    assert_eq!(graph.num_uses(a), 3);
    assert_eq!(graph.users(a).len(), 3);

    graph.replace_all_uses_with(a, b);
    assert!(!graph.has_uses(a));
    assert_eq!(graph.num_uses(b), 3);
    assert_eq!(graph.op(ret).operands(), &[b, n1, n2]);
}

#[test]
fn test_erase_requires_no_uses() {
    let mut f = Func::new("f", [ty("tensor<4xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    let neg = negate(&mut b, arg);
    let ret = func::return_(&mut b, [neg]);

    let graph = f.body_mut();
    let neg_op = graph.defining_op(neg).unwrap();
    let err = graph.erase_op(neg_op).unwrap_err();
    assert!(matches!(err, Error::EraseWithUses { uses: 1, .. }), "unexpected error: {err}");

    graph.erase_op(ret).unwrap();
    graph.erase_op(neg_op).unwrap();
    assert_eq!(graph.num_ops(), 0);
    assert!(!graph.is_live(neg_op));
    assert!(!graph.is_value_live(neg));
    assert!(graph.is_value_live(arg));
}

#[test]
fn test_rollback_forgets_new_ops() {
    let mut f = Func::new("f", [ty("tensor<4xf32>")]);
    let arg = f.argument(0);
    let ret = func::return_(&mut f.builder(), [arg]);

    let checkpoint = f.body().checkpoint();
    let mut b = OpBuilder::before(f.body_mut(), ret);
    let tmp = negate(&mut b, arg);
    arith::constant_index(&mut b, 7);

    let graph = f.body_mut();
    assert_eq!(graph.created_since(checkpoint).count(), 2);
    graph.rollback(checkpoint);

    assert_eq!(graph.ops(), &[ret]);
    assert_eq!(graph.created_since(checkpoint).count(), 0);
    assert!(!graph.is_value_live(tmp));
}

#[test]
fn test_clone_op_keeps_attributes() {
    let mut f = Func::new("f", [ty("tensor<4xf32>"), ty("memref<4xf32>")]);
    let (input, output) = (f.argument(0), f.argument(1));
    let original = f.body_mut().insert(
        InsertPoint::End,
        OperationState::new(NEGATE).operand(input).result(ty("tensor<4xf32>")).attr("tag", 3i64),
        &Default::default(),
    );

    let clone = OpBuilder::before(f.body_mut(), original).clone_op(original, [input, output], std::iter::empty());

    let graph = f.body();
    assert_eq!(graph.position(clone), Some(0));
    let cloned = graph.op(clone);
    assert!(cloned.is_a(NEGATE));
    assert_eq!(cloned.operands(), &[input, output]);
    assert_eq!(cloned.num_results(), 0);
    assert_eq!(cloned.attr("tag").and_then(|a| a.as_int()), Some(3));
}
