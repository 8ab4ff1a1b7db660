use proptest::prelude::*;
use tmir_ir::dialect::{func, memref, tm_tensor};
use tmir_ir::{Dim, Func, InterfaceRegistry, Type, verify};
use tmir_runtime::{Value, array, execute};

use super::generators::{arb_shape_and_dim, arb_static_case, tensor, without};
use crate::pass::BufferizePass;
use crate::test::helpers::count;

fn scan_over(shape: &[Dim], dim: usize) -> Func {
    let value = Type::RankedTensor(tensor(shape));
    let acc = Type::RankedTensor(tensor(&without(shape, dim)));
    let mut f = Func::new("scan", [value.clone(), value, acc]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let op = tm_tensor::scan(&mut b, input, output, acc, dim, true);
    let results = b.op(op).results().to_vec();
    func::return_(&mut b, results);
    f
}

fn dynamic_dims(shape: &[Dim]) -> usize {
    shape.iter().filter(|d| d.is_dynamic()).count()
}

proptest! {
    #[test]
    fn bufferized_scan_is_well_formed((shape, dim) in arb_shape_and_dim()) {
        let mut f = scan_over(&shape, dim);
        let stats = BufferizePass::default().run(&mut f).unwrap();
        prop_assert!(verify(&f, &InterfaceRegistry::with_builtin_dialects()).is_ok());

        prop_assert_eq!(stats.rewritten(), 1);
        prop_assert_eq!(count(&f, memref::ALLOC), 2);
        prop_assert_eq!(count(&f, memref::COPY), 1);
        // Fresh output sized from its tied buffer, accumulator clone sized from itself.
        prop_assert_eq!(count(&f, memref::DIM), dynamic_dims(&shape) + dynamic_dims(&without(&shape, dim)));

        let body = f.body();
        let scan = body.op(body.ops_named(tm_tensor::SCAN).next().unwrap());
        prop_assert!(scan.operands().iter().all(|&v| body.value_type(v).is_buffer()));
    }

    #[test]
    fn bufferized_scan_computes_the_same_values((shape, dim, data) in arb_static_case()) {
        let dims: Vec<Dim> = shape.iter().copied().map(Dim::Static).collect();
        let original = scan_over(&dims, dim);
        let mut converted = original.clone();
        BufferizePass::default().run(&mut converted).unwrap();

        let acc_shape: Vec<usize> = shape.iter().enumerate().filter(|&(i, _)| i != dim).map(|(_, &n)| n).collect();
        let acc_len: usize = acc_shape.iter().product();
        let args = || -> Vec<Value> {
            vec![
                array(&shape, data.clone()).unwrap(),
                array(&shape, vec![0.0; data.len()]).unwrap(),
                array(&acc_shape, vec![1.0; acc_len]).unwrap(),
            ]
        };

        let expected: Vec<Vec<f64>> =
            execute(&original, &args()).unwrap().iter().map(|v| v.as_array().unwrap().to_vec()).collect();
        let inputs = args();
        let actual: Vec<Vec<f64>> =
            execute(&converted, &inputs).unwrap().iter().map(|v| v.as_array().unwrap().to_vec()).collect();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(inputs[2].as_array().unwrap().to_vec(), vec![1.0; acc_len]);
    }
}
