//! Function fixtures for the bufferization tests.

use tmir_ir::dialect::{func, tm_tensor};
use tmir_ir::{Func, OpName, Type};

/// Parse a type, panicking on malformed input.
pub fn ty(text: &str) -> Type {
    text.parse().unwrap_or_else(|e| panic!("bad test type {text:?}: {e}"))
}

pub fn op_names(f: &Func) -> Vec<String> {
    f.body().ops().iter().map(|&op| f.body().op(op).name().to_string()).collect()
}

pub fn count(f: &Func, name: OpName) -> usize {
    f.body().ops_named(name).count()
}

/// `return scan(%input) outs(%output, %acc)` along `dim`, inclusive.
pub fn scan_func(input: &str, output: &str, acc: &str, dim: usize) -> Func {
    let mut f = Func::new("scan", [ty(input), ty(output), ty(acc)]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let op = tm_tensor::scan(&mut b, input, output, acc, dim, true);
    let results = b.op(op).results().to_vec();
    func::return_(&mut b, results);
    f
}

/// `return topk(%values) outs(%out_values, %out_indices)` along `dim`.
pub fn topk_func(values: &str, out_values: &str, out_indices: &str, dim: usize) -> Func {
    let mut f = Func::new("topk", [ty(values), ty(out_values), ty(out_indices)]);
    let (values, out_values, out_indices) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let op = tm_tensor::topk(&mut b, values, out_values, out_indices, dim);
    let results = b.op(op).results().to_vec();
    func::return_(&mut b, results);
    f
}

/// Scan whose running values are then sorted in place.
pub fn scan_then_sort(shape: &str, acc: &str) -> Func {
    let mut f = Func::new("scan_then_sort", [ty(shape), ty(shape), ty(acc)]);
    let (input, output, acc) = (f.argument(0), f.argument(1), f.argument(2));
    let mut b = f.builder();
    let scan = tm_tensor::scan(&mut b, input, output, acc, 0, true);
    let running = b.op(scan).result(0);
    let sort = tm_tensor::sort(&mut b, &[running], 0, true);
    let sorted = b.op(sort).result(0);
    func::return_(&mut b, [sorted]);
    f
}
