//! Compact band storage
//!
//! A general banded `m x n` matrix with `kl` sub-diagonals and `ku`
//! super-diagonals is stored column-major in a `(kl + ku + 1) x n` buffer with
//! leading dimension `lda >= kl + ku + 1`. Logical element `(i, j)` lives at
//! compact row `ku + i - j`, column `j`:
//!
//! ```text
//! 1 2 0 0 0          * 2 2 2 2
//! 3 1 2 0 0          1 1 1 1 1
//! 4 3 1 2 0   --->   3 3 3 3 *
//! 0 4 3 1 2          4 4 4 * *
//! 0 0 4 3 1
//! ```
//!
//! Cells marked `*` do not correspond to any logical element and are never
//! read or written by a kernel.
//!
//! A Hermitian banded `n x n` matrix with `k` off-diagonals stores one
//! triangle in a `(k + 1) x n` buffer: the upper triangle at row `k + i - j`,
//! the lower triangle at row `i - j`.

use crate::dtype::Element;
use crate::error::{Error, Result};
use std::fmt;

/// Transpose mode of a matrix operand
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `op(A) = A`
    #[default]
    None,
    /// `op(A) = A^T`
    Transpose,
    /// `op(A) = A^H`
    ConjugateTranspose,
}

impl Operation {
    /// Single-letter BLAS code (`N`, `T`, `C`)
    pub const fn as_char(self) -> char {
        match self {
            Self::None => 'N',
            Self::Transpose => 'T',
            Self::ConjugateTranspose => 'C',
        }
    }

    /// True for `Transpose` and `ConjugateTranspose`
    #[inline]
    pub const fn is_transposed(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Length of `x` in `y = op(A) x` for an `m x n` matrix
    #[inline]
    pub const fn x_len(self, m: usize, n: usize) -> usize {
        if self.is_transposed() { m } else { n }
    }

    /// Length of `y` in `y = op(A) x` for an `m x n` matrix
    #[inline]
    pub const fn y_len(self, m: usize, n: usize) -> usize {
        if self.is_transposed() { n } else { m }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which triangle of a Hermitian matrix is stored
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Fill {
    /// Upper triangle (`j >= i`)
    #[default]
    Upper,
    /// Lower triangle (`i >= j`)
    Lower,
}

impl Fill {
    /// Single-letter BLAS code (`U`, `L`)
    pub const fn as_char(self) -> char {
        match self {
            Self::Upper => 'U',
            Self::Lower => 'L',
        }
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// True if compact cell `(row, col)` holds a logical element of an `m`-row
/// band with `ku` super-diagonals.
///
/// `row` must already be known to lie in `0..=kl + ku`. The super-diagonal
/// region (`row <= ku`) and the sub-diagonal region (`row > ku`) are disjoint
/// and together they admit exactly the cells whose logical row
/// `row - ku + col` is in `0..m`.
#[inline]
pub const fn in_band(row: usize, col: usize, ku: usize, m: usize) -> bool {
    if row <= ku {
        let first = ku - row;
        col >= first && col < first + m
    } else {
        let below = row - ku;
        below < m && col < m - below
    }
}

// ============================================================================
// General band
// ============================================================================

/// Geometry of a general banded matrix in compact storage
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BandLayout {
    /// Logical rows
    pub m: usize,
    /// Logical columns
    pub n: usize,
    /// Sub-diagonals
    pub kl: usize,
    /// Super-diagonals
    pub ku: usize,
    /// Leading dimension of the compact buffer
    pub lda: usize,
}

impl BandLayout {
    /// Tightly packed layout (`lda = kl + ku + 1`)
    pub const fn new(m: usize, n: usize, kl: usize, ku: usize) -> Self {
        Self {
            m,
            n,
            kl,
            ku,
            lda: kl + ku + 1,
        }
    }

    /// Same layout with a larger leading dimension
    pub fn with_lda(self, lda: usize) -> Result<Self> {
        if lda < self.band_rows() {
            return Err(Error::invalid_value(
                "lda",
                format!("lda {} is smaller than kl + ku + 1 = {}", lda, self.band_rows()),
            ));
        }
        Ok(Self { lda, ..self })
    }

    /// Number of stored diagonals (`kl + ku + 1`)
    #[inline]
    pub const fn band_rows(&self) -> usize {
        self.kl + self.ku + 1
    }

    /// Number of elements in the compact buffer
    #[inline]
    pub const fn storage_len(&self) -> usize {
        self.lda * self.n
    }

    /// Compact row of logical element `(i, j)`, if it lies inside the band
    #[inline]
    pub fn compact_row(&self, i: usize, j: usize) -> Option<usize> {
        if i >= self.m || j >= self.n {
            return None;
        }
        let row = (self.ku + i).checked_sub(j)?;
        (row <= self.kl + self.ku).then_some(row)
    }

    /// Offset of logical element `(i, j)` in the compact buffer
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> Option<usize> {
        self.compact_row(i, j).map(|row| row + j * self.lda)
    }

    /// Pack a column-major dense matrix (leading dimension `ld`) into
    /// compact storage. Cells outside the band are zero.
    pub fn pack<T: Element>(&self, dense: &[T], ld: usize) -> Vec<T> {
        let mut band = vec![T::zero(); self.storage_len()];
        for j in 0..self.n {
            for i in 0..self.m {
                if let Some(idx) = self.index(i, j) {
                    band[idx] = dense[i + j * ld];
                }
            }
        }
        band
    }

    /// Expand compact storage to a column-major dense `m x n` matrix
    pub fn unpack<T: Element>(&self, band: &[T]) -> Vec<T> {
        let mut dense = vec![T::zero(); self.m * self.n];
        for j in 0..self.n {
            for i in 0..self.m {
                if let Some(idx) = self.index(i, j) {
                    dense[i + j * self.m] = band[idx];
                }
            }
        }
        dense
    }
}

// ============================================================================
// Hermitian band
// ============================================================================

/// Geometry of a Hermitian banded matrix in compact storage
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HermitianBandLayout {
    /// Order of the matrix
    pub n: usize,
    /// Off-diagonals on each side
    pub k: usize,
    /// Leading dimension of the compact buffer
    pub lda: usize,
    /// Stored triangle
    pub fill: Fill,
}

impl HermitianBandLayout {
    /// Tightly packed layout (`lda = k + 1`)
    pub const fn new(n: usize, k: usize, fill: Fill) -> Self {
        Self {
            n,
            k,
            lda: k + 1,
            fill,
        }
    }

    /// Number of elements in the compact buffer
    #[inline]
    pub const fn storage_len(&self) -> usize {
        self.lda * self.n
    }

    /// Where logical element `(i, j)` is read from.
    ///
    /// Returns the compact offset and whether the stored value must be
    /// conjugated (the element mirrors the stored triangle). `None` outside the
    /// band.
    #[inline]
    pub fn source(&self, i: usize, j: usize) -> Option<(usize, bool)> {
        if i >= self.n || j >= self.n || i.abs_diff(j) > self.k {
            return None;
        }
        let (r, c, mirrored) = match self.fill {
            Fill::Upper if i <= j => (self.k + i - j, j, false),
            Fill::Upper => (self.k + j - i, i, true),
            Fill::Lower if i >= j => (i - j, j, false),
            Fill::Lower => (j - i, i, true),
        };
        Some((r + c * self.lda, mirrored))
    }

    /// Logical element `(i, j)` of the Hermitian matrix held in `band`
    ///
    /// The imaginary part of a diagonal element is ignored.
    pub fn element<T: Element>(&self, band: &[T], i: usize, j: usize) -> T {
        match self.source(i, j) {
            None => T::zero(),
            Some((idx, _)) if i == j => T::from_real(band[idx].real()),
            Some((idx, true)) => band[idx].conj(),
            Some((idx, false)) => band[idx],
        }
    }

    /// Pack the stored triangle of a column-major dense `n x n` matrix
    /// (leading dimension `ld`). Cells outside the band are zero.
    pub fn pack<T: Element>(&self, dense: &[T], ld: usize) -> Vec<T> {
        let mut band = vec![T::zero(); self.storage_len()];
        for j in 0..self.n {
            for i in 0..self.n {
                if let Some((idx, false)) = self.source(i, j) {
                    band[idx] = dense[i + j * ld];
                }
            }
        }
        band
    }
}
