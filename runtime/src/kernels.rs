//! Reference kernels of the tensor-algebra ops.
//!
//! Every kernel writes into its output arrays in place. Inputs are read in
//! full before anything is written, so an output aliasing an input is safe.

use snafu::ensure;
use tmir_ir::OpName;
use tmir_ir::dialect::tm_tensor::{self, ScatterCombiner};

use crate::buffer::{Array, Lanes};
use crate::error::{IndexOutOfBoundsSnafu, Result, ShapeMismatchSnafu};

fn check_shape(op: OpName, expected: &[usize], actual: &[usize]) -> Result<()> {
    ensure!(expected == actual, ShapeMismatchSnafu { op, expected: expected.to_vec(), actual: actual.to_vec() });
    Ok(())
}

fn check_dim(op: OpName, array: &Array, dim: usize) -> Result<()> {
    ensure!(dim < array.rank(), IndexOutOfBoundsSnafu { op, index: dim, extent: array.rank() });
    Ok(())
}

fn without(shape: &[usize], dim: usize) -> Vec<usize> {
    shape.iter().enumerate().filter(|&(i, _)| i != dim).map(|(_, &n)| n).collect()
}

/// Running sum along `dim`, seeded from `accumulator`. The accumulator ends up
/// holding the total of each lane.
///
/// Inclusive: `output[i] = acc + input[0] + ... + input[i]`.
/// Exclusive: `output[i] = acc + input[0] + ... + input[i - 1]`.
pub fn scan(input: &Array, output: &Array, accumulator: &Array, dim: usize, inclusive: bool) -> Result<()> {
    let op = tm_tensor::SCAN;
    check_dim(op, input, dim)?;
    check_shape(op, input.shape(), output.shape())?;
    check_shape(op, &without(input.shape(), dim), accumulator.shape())?;

    let lanes = Lanes::new(input.shape(), dim);
    let source = input.to_vec();
    let mut totals = accumulator.to_vec();
    let mut result = vec![0.0; source.len()];

    for (o, j) in lanes.lanes() {
        let slot = o * lanes.inner + j;
        let mut running = totals[slot];
        for i in 0..lanes.len {
            let at = lanes.at(o, i, j);
            if inclusive {
                running += source[at];
                result[at] = running;
            } else {
                result[at] = running;
                running += source[at];
            }
        }
        totals[slot] = running;
    }

    output.write(|data| data.copy_from_slice(&result));
    accumulator.write(|data| data.copy_from_slice(&totals));
    Ok(())
}

/// Merge the rows of `updates` into the rows of `original` selected by
/// `indices` (shape `[n]` or `[n, 1]`).
pub fn scatter(updates: &Array, indices: &Array, original: &Array, combiner: ScatterCombiner) -> Result<()> {
    let op = tm_tensor::SCATTER;
    let count = indices.shape().first().copied().unwrap_or(1);
    check_shape(op, &[count], &[indices.len()])?;
    ensure!(updates.rank() >= 1 && original.rank() >= 1, ShapeMismatchSnafu {
        op,
        expected: vec![count],
        actual: updates.shape().to_vec(),
    });
    check_shape(op, &original.shape()[1..], &updates.shape()[1..])?;
    check_shape(op, &[count], &updates.shape()[..1])?;

    let rows = original.shape()[0];
    let row_len: usize = original.shape()[1..].iter().product();
    let index_values = indices.to_vec();
    let update_values = updates.to_vec();
    let mut result = original.to_vec();

    for (n, &raw) in index_values.iter().enumerate() {
        let row = raw as usize;
        ensure!(raw >= 0.0 && raw.fract() == 0.0 && row < rows, IndexOutOfBoundsSnafu { op, index: row, extent: rows });
        for s in 0..row_len {
            let target = &mut result[row * row_len + s];
            let update = update_values[n * row_len + s];
            *target = match combiner {
                ScatterCombiner::Add => *target + update,
                ScatterCombiner::Assign => update,
            };
        }
    }

    original.write(|data| data.copy_from_slice(&result));
    Ok(())
}

/// Stable sort of `outputs[0]` along `dim`; the remaining outputs are
/// permuted the same way.
pub fn sort(outputs: &[Array], dim: usize, descending: bool) -> Result<()> {
    let op = tm_tensor::SORT;
    let Some(keys) = outputs.first() else {
        return Ok(());
    };
    check_dim(op, keys, dim)?;
    for payload in &outputs[1..] {
        check_shape(op, keys.shape(), payload.shape())?;
    }

    let lanes = Lanes::new(keys.shape(), dim);
    let key_values = keys.to_vec();
    let contents: Vec<Vec<f64>> = outputs.iter().map(Array::to_vec).collect();
    let mut sorted = contents.clone();

    let mut order: Vec<usize> = Vec::with_capacity(lanes.len);
    for (o, j) in lanes.lanes() {
        order.clear();
        order.extend(0..lanes.len);
        order.sort_by(|&a, &b| {
            let (ka, kb) = (key_values[lanes.at(o, a, j)], key_values[lanes.at(o, b, j)]);
            if descending { kb.total_cmp(&ka) } else { ka.total_cmp(&kb) }
        });
        for (position, &from) in order.iter().enumerate() {
            for (dst, src) in sorted.iter_mut().zip(&contents) {
                dst[lanes.at(o, position, j)] = src[lanes.at(o, from, j)];
            }
        }
    }

    for (output, values) in outputs.iter().zip(sorted) {
        output.write(|data| data.copy_from_slice(&values));
    }
    Ok(())
}

/// Largest `k` values along `dim` in descending order, with their positions.
/// `k` is the extent of the outputs along `dim`; ties keep the lower index
/// first.
pub fn topk(values: &Array, out_values: &Array, out_indices: &Array, dim: usize) -> Result<()> {
    let op = tm_tensor::TOPK;
    check_dim(op, values, dim)?;
    check_dim(op, out_values, dim)?;
    check_shape(op, out_values.shape(), out_indices.shape())?;
    check_shape(op, &without(values.shape(), dim), &without(out_values.shape(), dim))?;

    let k = out_values.shape()[dim];
    let source_lanes = Lanes::new(values.shape(), dim);
    ensure!(k <= source_lanes.len, IndexOutOfBoundsSnafu { op, index: k, extent: source_lanes.len });
    let target_lanes = Lanes::new(out_values.shape(), dim);

    let source = values.to_vec();
    let mut top_values = vec![0.0; out_values.len()];
    let mut top_indices = vec![0.0; out_indices.len()];
    let mut order: Vec<usize> = Vec::with_capacity(source_lanes.len);

    for (o, j) in source_lanes.lanes() {
        order.clear();
        order.extend(0..source_lanes.len);
        order.sort_by(|&a, &b| source[source_lanes.at(o, b, j)].total_cmp(&source[source_lanes.at(o, a, j)]));
        for (position, &from) in order.iter().take(k).enumerate() {
            let at = target_lanes.at(o, position, j);
            top_values[at] = source[source_lanes.at(o, from, j)];
            top_indices[at] = from as f64;
        }
    }

    out_values.write(|data| data.copy_from_slice(&top_values));
    out_indices.write(|data| data.copy_from_slice(&top_indices));
    Ok(())
}

/// `softmax(Q K^T / sqrt(d)) V` over the last two dimensions; leading
/// dimensions are batch dimensions.
pub fn attention(query: &Array, key: &Array, value: &Array, output: &Array) -> Result<()> {
    let op = tm_tensor::ATTENTION;
    let rank = query.rank();
    ensure!(rank >= 2, ShapeMismatchSnafu { op, expected: vec![0, 0], actual: query.shape().to_vec() });
    for other in [key, value, output] {
        ensure!(other.rank() == rank, ShapeMismatchSnafu {
            op,
            expected: query.shape().to_vec(),
            actual: other.shape().to_vec(),
        });
        check_shape(op, &query.shape()[..rank - 2], &other.shape()[..rank - 2])?;
    }

    let (m, d) = (query.shape()[rank - 2], query.shape()[rank - 1]);
    let n = key.shape()[rank - 2];
    let e = value.shape()[rank - 1];
    check_shape(op, &[n, d], &key.shape()[rank - 2..])?;
    check_shape(op, &[n, e], &value.shape()[rank - 2..])?;
    check_shape(op, &[m, e], &output.shape()[rank - 2..])?;

    let batch: usize = query.shape()[..rank - 2].iter().product();
    let (q, k, v) = (query.to_vec(), key.to_vec(), value.to_vec());
    let mut result = vec![0.0; batch * m * e];
    let scale = 1.0 / (d as f64).sqrt();
    let mut weights = vec![0.0; n];

    for bi in 0..batch {
        let (q, k, v) = (&q[bi * m * d..], &k[bi * n * d..], &v[bi * n * e..]);
        for row in 0..m {
            for (col, weight) in weights.iter_mut().enumerate() {
                *weight = (0..d).map(|x| q[row * d + x] * k[col * d + x]).sum::<f64>() * scale;
            }
            let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            weights.iter_mut().for_each(|w| *w = (*w - max).exp());
            let total: f64 = weights.iter().sum();

            let out = &mut result[(bi * m + row) * e..(bi * m + row + 1) * e];
            for (col, &weight) in weights.iter().enumerate() {
                for (y, slot) in out.iter_mut().enumerate() {
                    *slot += weight / total * v[col * e + y];
                }
            }
        }
    }

    output.write(|data| data.copy_from_slice(&result));
    Ok(())
}
