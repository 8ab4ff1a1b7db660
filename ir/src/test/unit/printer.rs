use crate::dialect::{arith, func, tm_tensor};
use crate::func::Func;
use crate::location::Location;
use crate::test::helpers::ty;

#[test]
fn test_print_func() {
    let mut f = Func::new("f", [ty("tensor<4xf32>")]);
    let arg = f.argument(0);
    let mut b = f.builder();
    arith::constant_index(&mut b, 2);
    func::return_(&mut b, [arg]);

    let expected = "\
func.func @f(%0: tensor<4xf32>) {
  %1 = \"arith.constant\"() {value = 2} : () -> index
  \"func.return\"(%0) : (tensor<4xf32>) -> ()
}";
    assert_eq!(f.to_string(), expected);
}

#[test]
fn test_print_multi_result_op() {
    let mut f = Func::new("scan", [ty("tensor<8xf32>"), ty("tensor<8xf32>"), ty("tensor<f32>")]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let op = tm_tensor::scan(&mut f.builder(), input, output, acc, 0, true);

    let text = f.body().display_op(op).to_string();
    assert_eq!(
        text,
        "%3, %4 = \"tm_tensor.scan\"(%0, %1, %2) {dimension = 0, inclusive = true, operand_segment_sizes = [1, 2]} \
         : (tensor<8xf32>, tensor<8xf32>, tensor<f32>) -> (tensor<8xf32>, tensor<f32>)"
    );
}

#[test]
fn test_location_display() {
    assert_eq!(Location::Unknown.to_string(), "loc(unknown)");
    assert_eq!(Location::file("model.mlir", 3, 14).to_string(), "loc(\"model.mlir\":3:14)");
    assert_eq!(Location::name("scan").to_string(), "loc(\"scan\")");
}
