//! Element types shared by tensors and buffers.
//!
//! A [`DType`] is the element type of a value-semantic tensor or of a memory
//! buffer. Conversion between the two never changes the element type, so this
//! crate is deliberately small: naming, byte widths and classification.

pub mod ext;


pub use ext::HasDType;

/// Element type of a shaped value.
///
/// The textual form follows the usual IR spelling (`i1`, `i32`, `ui8`, `f32`,
/// `bf16`, ...), and is what [`std::fmt::Display`] prints and
/// [`std::str::FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::Display, strum::EnumString)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
pub enum DType {
    #[strum(to_string = "i1")]
    Bool,

    #[strum(to_string = "i8")]
    Int8,
    #[strum(to_string = "i16")]
    Int16,
    #[strum(to_string = "i32")]
    Int32,
    #[strum(to_string = "i64")]
    Int64,

    #[strum(to_string = "ui8")]
    UInt8,
    #[strum(to_string = "ui16")]
    UInt16,
    #[strum(to_string = "ui32")]
    UInt32,
    #[strum(to_string = "ui64")]
    UInt64,

    #[strum(to_string = "f16")]
    Float16,
    #[strum(to_string = "bf16")]
    BFloat16,
    #[strum(to_string = "f32")]
    Float32,
    #[strum(to_string = "f64")]
    Float64,
}

impl DType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// Width in bits, as used by the textual form.
    pub const fn bit_width(&self) -> usize {
        match self {
            Self::Bool => 1,
            _ => self.bytes() * 8,
        }
    }
}
