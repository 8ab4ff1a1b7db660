//! Value types of the IR.
//!
//! Tensors and memrefs share one shape vocabulary: a ranked type carries a
//! list of [`Dim`]s, each either a static extent or a dynamic marker, while an
//! unranked type only knows its element type. The textual form mirrors the
//! usual IR spelling (`tensor<4x?xf32>`, `memref<*xi64>`, `index`).

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};
use tmir_dtype::DType;

use crate::error::{Error, ParseTypeSnafu};

/// One dimension of a ranked shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Extent known when the IR is built.
    Static(usize),
    /// Extent only known at runtime.
    Dynamic,
}

impl Dim {
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    pub const fn as_static(&self) -> Option<usize> {
        match self {
            Self::Static(n) => Some(*n),
            Self::Dynamic => None,
        }
    }
}

impl From<usize> for Dim {
    fn from(n: usize) -> Self {
        Self::Static(n)
    }
}

impl From<Option<usize>> for Dim {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Self::Dynamic, Self::Static)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(n) => write!(f, "{n}"),
            Self::Dynamic => f.write_str("?"),
        }
    }
}

/// Dimension list of a ranked type.
///
/// Inline capacity of 4 covers the ranks the tensor-algebra ops work with
/// without touching the heap.
pub type Shape = SmallVec<[Dim; 4]>;

/// Shape plus element type, shared by ranked tensors and ranked memrefs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankedType {
    shape: Shape,
    dtype: DType,
}

impl RankedType {
    pub fn new<D: Into<Dim>>(shape: impl IntoIterator<Item = D>, dtype: DType) -> Self {
        Self { shape: shape.into_iter().map(Into::into).collect(), dtype }
    }

    pub fn shape(&self) -> &[Dim] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn has_static_shape(&self) -> bool {
        self.shape.iter().all(Dim::is_static)
    }

    pub fn num_dynamic_dims(&self) -> usize {
        self.shape.iter().filter(|d| d.is_dynamic()).count()
    }

    /// Positions of the dynamic dimensions, in order.
    pub fn dynamic_dims(&self) -> impl Iterator<Item = usize> + '_ {
        self.shape.iter().enumerate().filter(|(_, d)| d.is_dynamic()).map(|(i, _)| i)
    }

    /// Static extents, if every dimension is static.
    pub fn static_shape(&self) -> Option<SmallVec<[usize; 4]>> {
        self.shape.iter().map(Dim::as_static).collect()
    }
}

/// Type of an SSA value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Target-sized integer used for sizes and positions.
    Index,
    /// Scalar of the given element type.
    Scalar(DType),
    /// Immutable value-semantic array with a known rank.
    RankedTensor(RankedType),
    /// Immutable value-semantic array of unknown rank.
    UnrankedTensor(DType),
    /// Mutable buffer with a known rank.
    MemRef(RankedType),
    /// Mutable buffer of unknown rank.
    UnrankedMemRef(DType),
}

impl Type {
    pub fn tensor<D: Into<Dim>>(shape: impl IntoIterator<Item = D>, dtype: DType) -> Self {
        Self::RankedTensor(RankedType::new(shape, dtype))
    }

    pub fn memref<D: Into<Dim>>(shape: impl IntoIterator<Item = D>, dtype: DType) -> Self {
        Self::MemRef(RankedType::new(shape, dtype))
    }

    pub const fn unranked_tensor(dtype: DType) -> Self {
        Self::UnrankedTensor(dtype)
    }

    pub const fn unranked_memref(dtype: DType) -> Self {
        Self::UnrankedMemRef(dtype)
    }

    pub const fn is_tensor(&self) -> bool {
        matches!(self, Self::RankedTensor(_) | Self::UnrankedTensor(_))
    }

    /// Whether this is a memref, ranked or not.
    pub const fn is_buffer(&self) -> bool {
        matches!(self, Self::MemRef(_) | Self::UnrankedMemRef(_))
    }

    pub const fn is_shaped(&self) -> bool {
        self.is_tensor() || self.is_buffer()
    }

    /// Shape information of a ranked tensor or ranked memref.
    pub fn as_ranked(&self) -> Option<&RankedType> {
        match self {
            Self::RankedTensor(r) | Self::MemRef(r) => Some(r),
            _ => None,
        }
    }

    pub fn rank(&self) -> Option<usize> {
        self.as_ranked().map(RankedType::rank)
    }

    pub fn element_type(&self) -> Option<DType> {
        match self {
            Self::Index => None,
            Self::Scalar(dtype) | Self::UnrankedTensor(dtype) | Self::UnrankedMemRef(dtype) => Some(*dtype),
            Self::RankedTensor(r) | Self::MemRef(r) => Some(r.dtype()),
        }
    }

    pub fn has_static_shape(&self) -> bool {
        self.as_ranked().is_some_and(RankedType::has_static_shape)
    }
}

fn write_shaped(f: &mut fmt::Formatter<'_>, kind: &str, shape: Option<&[Dim]>, dtype: DType) -> fmt::Result {
    write!(f, "{kind}<")?;
    match shape {
        Some(dims) => {
            for dim in dims {
                write!(f, "{dim}x")?;
            }
        }
        None => f.write_str("*x")?,
    }
    write!(f, "{dtype}>")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::Scalar(dtype) => write!(f, "{dtype}"),
            Self::RankedTensor(r) => write_shaped(f, "tensor", Some(r.shape()), r.dtype()),
            Self::UnrankedTensor(dtype) => write_shaped(f, "tensor", None, *dtype),
            Self::MemRef(r) => write_shaped(f, "memref", Some(r.shape()), r.dtype()),
            Self::UnrankedMemRef(dtype) => write_shaped(f, "memref", None, *dtype),
        }
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text == "index" {
            return Ok(Self::Index);
        }

        let (kind, body) = match text.split_once('<') {
            Some((kind, rest)) => {
                let body = rest.strip_suffix('>').context(ParseTypeSnafu { input, reason: "missing closing '>'" })?;
                (kind, body)
            }
            None => {
                let dtype =
                    text.parse::<DType>().ok().context(ParseTypeSnafu { input, reason: "unknown scalar type" })?;
                return Ok(Self::Scalar(dtype));
            }
        };
        ensure!(kind == "tensor" || kind == "memref", ParseTypeSnafu { input, reason: "expected tensor or memref" });

        let mut parts: Vec<&str> = body.split('x').collect();
        let dtype = parts
            .pop()
            .and_then(|s| s.parse::<DType>().ok())
            .context(ParseTypeSnafu { input, reason: "unknown element type" })?;

        if parts == ["*"] {
            return Ok(if kind == "tensor" { Self::UnrankedTensor(dtype) } else { Self::UnrankedMemRef(dtype) });
        }

        let mut shape = Shape::with_capacity(parts.len());
        for part in parts {
            let dim = match part {
                "?" => Dim::Dynamic,
                n => Dim::Static(n.parse().ok().context(ParseTypeSnafu { input, reason: "invalid dimension" })?),
            };
            shape.push(dim);
        }

        let ranked = RankedType { shape, dtype };
        Ok(if kind == "tensor" { Self::RankedTensor(ranked) } else { Self::MemRef(ranked) })
    }
}
