//! Dialect conversion framework.
//!
//! A conversion is described by three pieces: a [`TypeConverter`] saying what
//! every type should become, a [`ConversionTarget`] saying which operations
//! are acceptable afterwards, and a list of [`ConversionPattern`]s that rewrite
//! the unacceptable ones. [`apply_partial_conversion`] drives them.

pub mod driver;
pub mod pattern;
pub mod rewriter;
pub mod target;
pub mod type_converter;

pub use driver::{ConversionConfig, ConversionStats, apply_partial_conversion};
pub use pattern::{ConversionPattern, RewriteResult};
pub use rewriter::ConversionRewriter;
pub use target::{ConversionTarget, Legality, LegalityFn};
pub use type_converter::{ConversionFn, MaterializationFn, TypeConverter};
