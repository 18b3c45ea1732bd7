//! Implements `Convert` functions between various external types.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{SMatrix, Vector3};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait Convert<O> {
    fn convert(&self) -> O;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

/// Per-leg vectors into a matrix with one column per leg.
impl<const N: usize> Convert<SMatrix<f64, 3, N>> for [Vector3<f64>; N] {
    fn convert(&self) -> SMatrix<f64, 3, N> {
        SMatrix::<f64, 3, N>::from_fn(|r, c| self[c][r])
    }
}

/// A matrix with one column per leg into per-leg vectors.
impl<const N: usize> Convert<[Vector3<f64>; N]> for SMatrix<f64, 3, N> {
    fn convert(&self) -> [Vector3<f64>; N] {
        let mut out = [Vector3::zeros(); N];

        for (i, v) in out.iter_mut().enumerate() {
            *v = self.fixed_columns::<1>(i).into_owned();
        }

        out
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
