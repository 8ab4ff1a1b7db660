//! Host storage for tensors and buffers.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::{Result, StorageSizeSnafu};

/// Row-major extents.
pub type Extents = SmallVec<[usize; 4]>;

/// Row-major `f64` array, possibly sharing its storage with other arrays.
///
/// Cloning an `Array` yields another view of the same storage; use
/// [`Array::deep_clone`] for an independent copy. Views are `!Send`, matching
/// the single-threaded interpreter.
#[derive(Debug, Clone)]
pub struct Array {
    data: Rc<RefCell<Vec<f64>>>,
    shape: Extents,
}

impl Array {
    /// Array of `shape` filled with `value`.
    pub fn filled(shape: &[usize], value: f64) -> Self {
        let len = shape.iter().product();
        Self { data: Rc::new(RefCell::new(vec![value; len])), shape: shape.into() }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::filled(shape, 0.0)
    }

    /// Freshly allocated memory. Filled with NaN so that reading it before
    /// writing shows up in results.
    pub fn uninit(shape: &[usize]) -> Self {
        Self::filled(shape, f64::NAN)
    }

    pub fn from_vec(shape: &[usize], data: Vec<f64>) -> Result<Self> {
        let len: usize = shape.iter().product();
        ensure!(data.len() == len, StorageSizeSnafu { shape: shape.to_vec(), len: data.len() });
        Ok(Self { data: Rc::new(RefCell::new(data)), shape: shape.into() })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.borrow().clone()
    }

    /// Whether both arrays view the same storage.
    pub fn aliases(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Independent copy with the same shape and contents.
    pub fn deep_clone(&self) -> Self {
        Self { data: Rc::new(RefCell::new(self.to_vec())), shape: self.shape.clone() }
    }

    /// Same storage under another shape with the same element count.
    pub fn reshaped(&self, shape: &[usize]) -> Result<Self> {
        let len: usize = shape.iter().product();
        ensure!(len == self.len(), StorageSizeSnafu { shape: shape.to_vec(), len: self.len() });
        Ok(Self { data: Rc::clone(&self.data), shape: shape.into() })
    }

    pub fn read<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        f(&self.data.borrow())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut [f64]) -> R) -> R {
        f(&mut self.data.borrow_mut())
    }

    /// Overwrite the contents with those of `source`. Shapes must already
    /// have been checked by the caller.
    pub fn copy_from(&self, source: &Array) {
        if self.aliases(source) {
            return;
        }
        let values = source.to_vec();
        self.write(|data| data.copy_from_slice(&values));
    }
}

/// Decomposition of a shape around one dimension: `outer x len x inner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lanes {
    pub outer: usize,
    pub len: usize,
    pub inner: usize,
}

impl Lanes {
    pub fn new(shape: &[usize], dim: usize) -> Self {
        Self {
            outer: shape[..dim].iter().product(),
            len: shape[dim],
            inner: shape[dim + 1..].iter().product(),
        }
    }

    /// Flat offset of element `i` of lane `(o, j)`.
    pub fn at(&self, o: usize, i: usize, j: usize) -> usize {
        (o * self.len + i) * self.inner + j
    }

    /// Iterate the `(outer, inner)` lane coordinates.
    pub fn lanes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.outer).flat_map(move |o| (0..self.inner).map(move |j| (o, j)))
    }
}
