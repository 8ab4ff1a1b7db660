//! Tensor to buffer type table and the materializations bridging the two.
//!
//! | original          | converted          |
//! |-------------------|--------------------|
//! | `tensor<SxT>`     | `memref<SxT>`      |
//! | `tensor<*xT>`     | `memref<*xT>`      |
//! | anything else     | unchanged          |

use snafu::ensure;
use tmir_ir::builder::OpBuilder;
use tmir_ir::conversion::TypeConverter;
use tmir_ir::dialect::bufferization;
use tmir_ir::error::{MaterializationAritySnafu, MaterializationInputSnafu};
use tmir_ir::{MaterializationKind, Type, ValueId};

use crate::cast::cast_or_realloc;

/// Buffer type of `ty`. Non-tensor types map to themselves.
pub fn buffer_type(ty: &Type) -> Type {
    match ty {
        Type::RankedTensor(ranked) => Type::MemRef(ranked.clone()),
        Type::UnrankedTensor(dtype) => Type::UnrankedMemRef(*dtype),
        other => other.clone(),
    }
}

/// Converter used by the bufferization pass.
pub fn bufferize_type_converter() -> TypeConverter {
    let mut converter = TypeConverter::new();
    converter.add_conversion(|ty| Some(ty.clone()));
    converter.add_conversion(|ty| ty.is_tensor().then(|| buffer_type(ty)));
    converter.add_source_materialization(materialize_to_tensor);
    converter.add_target_materialization(materialize_to_buffer);
    converter
}

/// Wrap a buffer as a tensor of type `ty`.
///
/// Declines non-tensor targets. Anything but a single buffer input is a
/// contract violation.
pub fn materialize_to_tensor(b: &mut OpBuilder<'_>, ty: &Type, inputs: &[ValueId]) -> tmir_ir::Result<Option<ValueId>> {
    if !ty.is_tensor() {
        return Ok(None);
    }
    let kind = MaterializationKind::Source;
    ensure!(inputs.len() == 1, MaterializationAritySnafu { kind, actual: inputs.len() });

    let from = b.value_type(inputs[0]);
    ensure!(from.is_buffer(), MaterializationInputSnafu { kind, from: from.clone(), to: ty.clone() });
    Ok(Some(bufferization::to_tensor(b, ty.clone(), inputs[0])))
}

/// Produce a buffer of type `ty` from a tensor or from a buffer of another
/// type.
///
/// Buffer inputs are cast or reallocated; ranked to unranked must be spelled
/// out by the caller, so that case declines. Tensor inputs are exposed with
/// `bufferization.to_buffer`.
pub fn materialize_to_buffer(b: &mut OpBuilder<'_>, ty: &Type, inputs: &[ValueId]) -> tmir_ir::Result<Option<ValueId>> {
    if !ty.is_buffer() {
        return Ok(None);
    }
    let kind = MaterializationKind::Target;
    ensure!(inputs.len() == 1, MaterializationAritySnafu { kind, actual: inputs.len() });

    let input = inputs[0];
    let from = b.value_type(input).clone();
    match (&from, ty) {
        (Type::MemRef(_), Type::MemRef(target)) => cast_or_realloc(b, input, target, None),
        (Type::MemRef(_), _) => Ok(None),
        (from, _) if from.is_tensor() => Ok(Some(bufferization::to_buffer(b, ty.clone(), input))),
        _ => MaterializationInputSnafu { kind, from: from.clone(), to: ty.clone() }.fail(),
    }
}
