//! Generator-matrix construction and Gauss-Jordan elimination over GF(2^8)
//!
//! The systematic encoding matrix A for n data and m parity shards is an
//! (n+m)×n matrix whose top n×n block is the identity and whose bottom
//! m×n block is the parity matrix F. A starts as a Vandermonde seed
//! (`A[i][j] = i^j` in the field) and is reduced to systematic form by
//! **column-wise** Gauss-Jordan: pivots traverse columns and elimination
//! subtracts column multiples, because the unknowns of the encoding
//! system correspond to columns. The same elimination, run on the n×n
//! matrix gathered from any n distinct rows of A, yields the inverse used
//! for reconstruction; every such submatrix is invertible, which is what
//! makes m arbitrary shard losses tolerable.

use crate::error::{ErasureError, Result};
use crate::galois::Galois8;

/// Row-major matrix of GF(2^8) elements with runtime dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Galois8>,
}

impl Matrix {
    /// Create a zero matrix, reporting allocation failure instead of
    /// aborting.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let len = rows * cols;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| ErasureError::OutOfMemory { bytes: len })?;
        data.resize(len, Galois8::ZERO);
        Ok(Matrix { rows, cols, data })
    }

    /// Create an identity matrix
    pub fn identity(size: usize) -> Result<Self> {
        let mut matrix = Self::new(size, size)?;
        for i in 0..size {
            matrix.set(i, i, Galois8::ONE);
        }
        Ok(matrix)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Galois8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Galois8) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow a row as a slice
    #[inline]
    pub fn row(&self, row: usize) -> &[Galois8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    fn swap_cols(&mut self, a: usize, b: usize) {
        for row in 0..self.rows {
            self.data.swap(row * self.cols + a, row * self.cols + b);
        }
    }
}

/// Build the systematic encoding matrix.
///
/// Seeds `A[i][j] = i^j` with the row index taken as a field element
/// (hence the stripe-wide bound of 256 shards), then reduces the top
/// cols×cols block to the identity. The reduction transforms all rows,
/// so the bottom (rows-cols)×cols block ends up as the parity matrix.
pub fn generate_encoding_matrix(rows: usize, cols: usize) -> Result<Matrix> {
    let mut mat = Matrix::new(rows, cols)?;
    for i in 0..rows {
        for j in 0..cols {
            mat.set(i, j, Galois8::new(i as u8).pow(j));
        }
    }
    gaussian_eliminate(&mut mat, None)?;
    Ok(mat)
}

/// Build the parity matrix F: the bottom `parity`×`data` block of the
/// systematic encoding matrix.
pub fn generate_parity_matrix(parity: usize, data: usize) -> Result<Matrix> {
    let full = generate_encoding_matrix(parity + data, data)?;
    let mut f = Matrix::new(parity, data)?;
    for i in 0..parity {
        for j in 0..data {
            f.set(i, j, full.get(data + i, j));
        }
    }
    Ok(f)
}

/// Column-wise Gauss-Jordan elimination.
///
/// Reduces the top cols×cols block of `mat` to the identity, applying
/// every column operation across all rows. When `inv` is given the
/// system must be square; `inv` is initialized to the identity, receives
/// the same column operations, and ends as the inverse of the original
/// `mat`.
///
/// A missing pivot means the system is singular. The matrices this crate
/// feeds in are Vandermonde-derived and cannot be singular unless the
/// caller gathered a duplicate source row, so the error is surfaced as a
/// domain error rather than handled.
pub fn gaussian_eliminate(mat: &mut Matrix, mut inv: Option<&mut Matrix>) -> Result<()> {
    let rows = mat.rows();
    let cols = mat.cols();
    debug_assert!(rows >= cols);

    if let Some(inv) = inv.as_deref_mut() {
        if rows != cols {
            return Err(ErasureError::NonSquareInverse { rows, cols });
        }
        *inv = Matrix::identity(rows)?;
    }

    for i in 0..cols {
        // Pivot search: the diagonal entry must be nonzero; swap in the
        // nearest nonzero column to its right if it is not.
        if mat.get(i, i).is_zero() {
            let pivot = ((i + 1)..cols)
                .find(|&j| !mat.get(i, j).is_zero())
                .ok_or(ErasureError::SingularMatrix)?;
            mat.swap_cols(i, pivot);
            if let Some(inv) = inv.as_deref_mut() {
                inv.swap_cols(i, pivot);
            }
        }

        // Normalize: scale column i so the diagonal entry becomes 1
        let scale = Galois8::ONE
            .checked_div(mat.get(i, i))
            .ok_or(ErasureError::DivisionByZero)?;
        for e in 0..rows {
            mat.set(e, i, scale * mat.get(e, i));
        }
        if let Some(inv) = inv.as_deref_mut() {
            for e in 0..rows {
                inv.set(e, i, scale * inv.get(e, i));
            }
        }

        // Eliminate: clear row i of every other column by XORing in the
        // right multiple of column i
        for j in 0..cols {
            if j == i {
                continue;
            }
            let factor = mat.get(i, j);
            if factor.is_zero() {
                continue;
            }
            for e in 0..rows {
                let updated = mat.get(e, j) + factor * mat.get(e, i);
                mat.set(e, j, updated);
            }
            if let Some(inv) = inv.as_deref_mut() {
                for e in 0..rows {
                    let updated = inv.get(e, j) + factor * inv.get(e, i);
                    inv.set(e, j, updated);
                }
            }
        }
    }

    Ok(())
}
