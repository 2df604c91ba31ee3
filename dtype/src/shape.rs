//! Tensor shape descriptor.

use std::fmt;

use smallvec::SmallVec;

use crate::{ElementType, ScalarKind};

/// Element type plus ordered dimension sizes of one kernel buffer.
///
/// Immutable once built. A rank-0 spec describes a single scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TensorSpec {
    element: ElementType,
    dims: SmallVec<[usize; 4]>,
}

impl TensorSpec {
    pub fn new(element: impl Into<ElementType>, dims: impl IntoIterator<Item = usize>) -> Self {
        Self { element: element.into(), dims: dims.into_iter().collect() }
    }

    /// Shorthand for a spec over a known scalar kind.
    pub fn scalar(kind: ScalarKind, dims: &[usize]) -> Self {
        Self::new(kind, dims.iter().copied())
    }

    pub fn element(&self) -> &ElementType {
        &self.element
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements, or `None` if it does not fit in `usize`.
    ///
    /// The empty product is 1, so scalars count as one. Any zero dimension
    /// makes the count zero regardless of the others.
    pub fn numel(&self) -> Option<usize> {
        if self.dims.contains(&0) {
            return Some(0);
        }
        self.dims.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    /// Buffer size in bytes. `None` if the element size is unknown or the
    /// size overflows `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        self.element.bytes()?.checked_mul(self.numel()?)
    }
}

impl From<(&str, &[usize])> for TensorSpec {
    fn from((element, dims): (&str, &[usize])) -> Self {
        Self::new(element, dims.iter().copied())
    }
}

impl<const N: usize> From<(&str, [usize; N])> for TensorSpec {
    fn from((element, dims): (&str, [usize; N])) -> Self {
        Self::new(element, dims)
    }
}

impl fmt::Display for TensorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.element, self.dims.as_slice())
    }
}
