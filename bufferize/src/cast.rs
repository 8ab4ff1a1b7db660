//! Buffer-to-buffer type adjustments.

use smallvec::SmallVec;
use tmir_ir::builder::OpBuilder;
use tmir_ir::dialect::memref;
use tmir_ir::{Dim, RankedType, Type, ValueId};

/// Whether a `memref.cast` from `source` to `target` can never fail at
/// runtime: same element type, same rank, and every target dimension either
/// equals the source dimension or is dynamic.
pub fn is_guaranteed_cast_compatible(source: &RankedType, target: &RankedType) -> bool {
    source.dtype() == target.dtype()
        && source.rank() == target.rank()
        && source.shape().iter().zip(target.shape()).all(|(s, t)| s == t || t.is_dynamic())
}

/// Whether two dimensions may describe the same runtime extent.
fn may_agree(source: &Dim, target: &Dim) -> bool {
    match (source, target) {
        (Dim::Static(s), Dim::Static(t)) => s == t,
        _ => true,
    }
}

/// View `value` as a buffer of type `target`.
///
/// Casts when that is always valid. Otherwise, when element type and rank
/// match and no dimension pair is statically contradictory, allocates a
/// buffer of the target type (dynamic extents read from the source) and
/// copies the data over. Returns `None` when neither applies.
pub fn cast_or_realloc(
    b: &mut OpBuilder<'_>,
    value: ValueId,
    target: &RankedType,
    alignment: Option<u64>,
) -> tmir_ir::Result<Option<ValueId>> {
    let Type::MemRef(source) = b.value_type(value).clone() else {
        return Ok(None);
    };

    if is_guaranteed_cast_compatible(&source, target) {
        return Ok(Some(memref::cast(b, value, Type::MemRef(target.clone()))));
    }

    let reallocatable = source.dtype() == target.dtype()
        && source.rank() == target.rank()
        && source.shape().iter().zip(target.shape()).all(|(s, t)| may_agree(s, t));
    if !reallocatable {
        tracing::trace!(from = %Type::MemRef(source), to = %Type::MemRef(target.clone()), "buffer cast declined");
        return Ok(None);
    }

    let dynamic_sizes: SmallVec<[ValueId; 4]> =
        target.dynamic_dims().map(|index| memref::dim(b, value, index)).collect();
    let buffer = memref::alloc(b, target.clone(), &dynamic_sizes, alignment)?;
    memref::copy(b, value, buffer);
    Ok(Some(buffer))
}
