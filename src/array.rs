//! Per-dimension divisor arrays for flat-index decomposition.

use crate::{Divisor, DivisorError, DivisorInt};

/// One precomputed [`Divisor`] per tensor dimension, paired with the
/// row-major stride it divides by.
///
/// Built once when a shape is fixed, then read from any number of kernel
/// lanes to turn flat offsets back into per-dimension coordinates without a
/// single hardware divide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisorArray<T: DivisorInt> {
    strides: Vec<T>,
    divisors: Vec<Divisor<T>>,
}

impl<T: DivisorInt> DivisorArray<T> {
    /// Builds row-major strides and their divisors for the given dimension
    /// extents (outermost dimension first).
    ///
    /// Fails if any stride is not a valid divisor: non-positive extents
    /// surface as [`DivisorError::ZeroOrNegative`], and shapes whose element
    /// count reaches half the unsigned range as [`DivisorError::OutOfRange`].
    pub fn from_dims(dims: &[T]) -> Result<Self, DivisorError> {
        if dims.iter().any(|&dim| dim <= T::zero()) {
            return Err(DivisorError::ZeroOrNegative);
        }
        let mut strides = vec![T::one(); dims.len()];
        for i in (0..dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1]
                .checked_mul(&dims[i + 1])
                .ok_or(DivisorError::OutOfRange)?;
        }
        let divisors = strides
            .iter()
            .map(|&stride| Divisor::new(stride))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DivisorArray { strides, divisors })
    }

    pub fn rank(&self) -> usize {
        self.divisors.len()
    }

    pub fn stride(&self, dim: usize) -> T {
        self.strides[dim]
    }

    pub fn divisor(&self, dim: usize) -> &Divisor<T> {
        &self.divisors[dim]
    }

    /// Decomposes a flat offset into one coordinate per dimension.
    pub fn decompose(&self, flat: T) -> Vec<T> {
        let mut coords = vec![T::zero(); self.rank()];
        self.decompose_into(flat, &mut coords);
        coords
    }

    /// Allocation-free decomposition; `coords.len()` must equal
    /// [`rank`](Self::rank).
    pub fn decompose_into(&self, flat: T, coords: &mut [T]) {
        assert_eq!(coords.len(), self.divisors.len());
        let mut rest = flat;
        for (i, divisor) in self.divisors.iter().enumerate() {
            let coord = divisor.divide(rest);
            rest = rest - coord * self.strides[i];
            coords[i] = coord;
        }
    }

    /// Recombines per-dimension coordinates into the flat offset.
    pub fn flatten(&self, coords: &[T]) -> T {
        assert_eq!(coords.len(), self.strides.len());
        coords
            .iter()
            .zip(&self.strides)
            .fold(T::zero(), |acc, (&coord, &stride)| acc + coord * stride)
    }
}
