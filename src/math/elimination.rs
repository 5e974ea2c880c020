//! Gaussian and Gauss-Jordan elimination with partial pivoting.
//!
//! Every routine copies its input into a [`Grid`], an owned row-major scratch
//! buffer, performs row operations on it and drops it. Callers never observe a
//! partially reduced matrix.

use num_traits::{PrimInt, Signed};
use tracing::{debug, trace};

use super::{Field, Matrix, Scalar, Vector};
use crate::error::{LinalgError, ShapeError};

/// Pivoting configuration for [`Matrix::inverse_with`], [`Matrix::solve_with`]
/// and [`Matrix::rank_with`].
///
/// A pivot is treated as zero when its magnitude is at most
/// `tolerance * scale`, with `scale` the largest absolute entry of the input
/// (so the test does not depend on the units of the matrix).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elimination<T> {
    /// Relative singularity threshold. Zero means "exact zero pivots only".
    pub tolerance: T,
}

impl<T: Field> Elimination<T> {
    /// Creates an elimination with the given relative tolerance.
    ///
    /// # Panics
    /// Panics if `tolerance` is negative or NaN.
    pub fn new(tolerance: T) -> Self {
        assert!(tolerance >= T::zero(), "tolerance must be non-negative, got {tolerance:?}");
        Self { tolerance }
    }

    /// Exact arithmetic: only pivots equal to zero count as singular.
    pub fn exact() -> Self {
        Self { tolerance: T::zero() }
    }

    /// Inverse of a square matrix by Gauss-Jordan reduction of `[A | I]`.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] if some pivot column has no entry above
    /// the tolerance, or holds a NaN.
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] for non-square input.
    #[track_caller]
    pub fn inverse(&self, a: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        let n = expect_square(a);
        let mut grid = Grid::augmented(a, n, |r, c| if r == c { T::one() } else { T::zero() });
        self.gauss_jordan(&mut grid, n, scale_of(a))?;
        Ok(grid.right_block(n))
    }

    /// Solution `x` of `A x = b` by Gauss-Jordan reduction of `[A | b]`.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] if `A` is singular.
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] if `A` is not square, and with
    /// [`ShapeError::ShapeMismatch`] if `b` does not have `A.rows()` entries.
    #[track_caller]
    pub fn solve(&self, a: &Matrix<T>, b: &Vector<T>) -> Result<Vector<T>, LinalgError> {
        let n = expect_square(a);
        if b.dim() != n {
            ShapeError::ShapeMismatch { op: "solve", left: a.shape(), right: (b.dim(), 1) }.raise();
        }
        let mut grid = Grid::augmented(a, 1, |r, _| b[r]);
        self.gauss_jordan(&mut grid, n, scale_of(a))?;
        Ok(Vector::new(n, |r| grid.get(r, n)))
    }

    /// Number of linearly independent rows.
    pub fn rank(&self, a: &Matrix<T>) -> usize {
        let (rows, cols) = a.shape();
        let threshold = self.tolerance * scale_of(a);
        let mut grid = Grid::from_matrix(a);
        let mut rank = 0;

        for col in 0..cols {
            if rank == rows {
                break;
            }
            let pivot = grid.pivot_row(rank, col);
            if negligible(grid.get(pivot, col), threshold) {
                trace!(col, "no pivot above threshold; column is dependent");
                continue;
            }
            grid.swap_rows(rank, pivot);
            grid.eliminate_below(rank, col);
            rank += 1;
        }

        rank
    }

    /// Reduce the left `n x n` block of `grid` to the identity, carrying the
    /// augmented columns along.
    fn gauss_jordan(&self, grid: &mut Grid<T>, n: usize, scale: T) -> Result<(), LinalgError> {
        let threshold = self.tolerance * scale;
        debug!(n, tolerance = ?self.tolerance, threshold = ?threshold, "gauss-jordan elimination");

        if let Some(col) = grid.nan_column(n) {
            debug!(col, "NaN entry; no usable pivot");
            return Err(LinalgError::SingularMatrix { pivot_column: col });
        }

        for col in 0..n {
            let pivot = grid.pivot_row(col, col);
            let value = grid.get(pivot, col);
            if negligible(value, threshold) {
                debug!(col, pivot = ?value, "singular matrix");
                return Err(LinalgError::SingularMatrix { pivot_column: col });
            }
            if pivot != col {
                trace!(from = pivot, to = col, "row swap");
                grid.swap_rows(col, pivot);
            }

            let inv = value.recip();
            grid.scale_row(col, inv);
            grid.set(col, col, T::one());

            for row in (0..n).filter(|&r| r != col) {
                let factor = grid.get(row, col);
                if !factor.is_zero() {
                    grid.sub_scaled_row(row, col, factor);
                    grid.set(row, col, T::zero());
                }
            }
        }

        Ok(())
    }
}

impl<T: Field> Default for Elimination<T> {
    /// Tolerance of [`Field::default_tolerance`].
    fn default() -> Self {
        Self { tolerance: T::default_tolerance() }
    }
}

/// Determinant by Gaussian elimination with partial pivoting.
///
/// Product of the pivots, negated once per row swap. An exactly zero pivot
/// means the matrix is singular and the determinant is zero.
#[track_caller]
pub(super) fn determinant<T: Field>(a: &Matrix<T>) -> T {
    let n = expect_square(a);
    let mut grid = Grid::from_matrix(a);
    let mut det = T::one();

    for col in 0..n {
        let pivot = grid.pivot_row(col, col);
        let value = grid.get(pivot, col);
        if value.is_zero() {
            debug!(col, "zero pivot; determinant is 0");
            return T::zero();
        }
        if pivot != col {
            trace!(from = pivot, to = col, "row swap");
            grid.swap_rows(col, pivot);
            det = -det;
        }
        det = det * value;
        grid.eliminate_below(col, col);
    }

    det
}

/// Exact determinant by fraction-free (Bareiss) elimination.
///
/// Every division performed is exact, so integer inputs give integer results
/// with no rounding. Intermediate values are minors of the input and obey
/// the same overflow limits as `T`.
#[track_caller]
pub(super) fn determinant_bareiss<T>(a: &Matrix<T>) -> T
where
    T: Scalar + PrimInt + Signed,
{
    let n = expect_square(a);
    let mut grid = Grid::from_matrix(a);
    let mut sign = T::one();
    let mut prev = T::one();

    for k in 0..n - 1 {
        if grid.get(k, k).is_zero() {
            match (k + 1..n).find(|&r| !grid.get(r, k).is_zero()) {
                Some(r) => {
                    grid.swap_rows(k, r);
                    sign = -sign;
                }
                None => return T::zero(),
            }
        }

        let pivot = grid.get(k, k);
        for i in k + 1..n {
            let lead = grid.get(i, k);
            for j in k + 1..n {
                let value = (grid.get(i, j) * pivot - lead * grid.get(k, j)) / prev;
                grid.set(i, j, value);
            }
            grid.set(i, k, T::zero());
        }
        prev = pivot;
    }

    sign * grid.get(n - 1, n - 1)
}

#[track_caller]
fn expect_square<T>(a: &Matrix<T>) -> usize {
    let (rows, cols) = (a.rows(), a.cols());
    if rows != cols {
        ShapeError::NotSquare { rows, cols }.raise();
    }
    rows
}

/// A pivot is unusable unless its magnitude is strictly above `threshold`.
/// NaN pivots and NaN thresholds are never usable.
#[inline]
fn negligible<T: Field>(value: T, threshold: T) -> bool {
    value.is_nan() || threshold.is_nan() || value.abs() <= threshold
}

/// Largest absolute entry, or one for the zero matrix.
fn scale_of<T: Field>(a: &Matrix<T>) -> T {
    let max = a.as_slice().iter().fold(T::zero(), |m, x| m.max(x.abs()));
    if max.is_zero() { T::one() } else { max }
}

/// Owned row-major scratch buffer for in-place row operations.
struct Grid<T> {
    cols: usize,
    data: Vec<T>,
}

impl<T: Scalar> Grid<T> {
    fn from_matrix(a: &Matrix<T>) -> Self {
        Self { cols: a.cols(), data: a.as_slice().to_vec() }
    }

    /// `[A | B]` where `B` has `extra` columns given by `f(row, col)`.
    fn augmented(a: &Matrix<T>, extra: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let cols = a.cols() + extra;
        let mut data = Vec::with_capacity(a.rows() * cols);
        for r in 0..a.rows() {
            data.extend(a.row_slice(r).iter().copied());
            data.extend((0..extra).map(|c| f(r, c)));
        }
        Self { cols, data }
    }

    #[inline]
    fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> T {
        self.data[r * self.cols + c]
    }

    #[inline]
    fn set(&mut self, r: usize, c: usize, value: T) {
        self.data[r * self.cols + c] = value;
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(hi * self.cols);
        head[lo * self.cols..(lo + 1) * self.cols].swap_with_slice(&mut tail[..self.cols]);
    }

    fn scale_row(&mut self, r: usize, factor: T) {
        for x in &mut self.data[r * self.cols..(r + 1) * self.cols] {
            *x = *x * factor;
        }
    }

    /// `row[target] -= factor * row[source]`
    fn sub_scaled_row(&mut self, target: usize, source: usize, factor: T) {
        for c in 0..self.cols {
            let value = self.get(target, c) - factor * self.get(source, c);
            self.set(target, c, value);
        }
    }

    /// Right-hand block of `width` columns as a matrix.
    fn right_block(&self, width: usize) -> Matrix<T> {
        let offset = self.cols - width;
        Matrix::new(self.rows(), width, |r, c| self.get(r, offset + c))
    }
}

impl<T: Field> Grid<T> {
    /// Row in `start..` holding the largest magnitude in `col`. Ties keep the
    /// topmost row.
    fn pivot_row(&self, start: usize, col: usize) -> usize {
        let mut best = start;
        let mut best_abs = self.get(start, col).abs();
        for r in start + 1..self.rows() {
            let candidate = self.get(r, col).abs();
            if candidate > best_abs {
                best = r;
                best_abs = candidate;
            }
        }
        best
    }

    /// First column of the left `width` columns holding a NaN.
    fn nan_column(&self, width: usize) -> Option<usize> {
        (0..width).find(|&c| (0..self.rows()).any(|r| self.get(r, c).is_nan()))
    }

    /// Zero out `col` below the pivot at `(pivot, col)`.
    fn eliminate_below(&mut self, pivot: usize, col: usize) {
        let value = self.get(pivot, col);
        for r in pivot + 1..self.rows() {
            let factor = self.get(r, col) / value;
            if !factor.is_zero() {
                self.sub_scaled_row(r, pivot, factor);
                self.set(r, col, T::zero());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn m(rows: &[&[f64]]) -> Matrix<f64> {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn grid_row_swap_is_symmetric() {
        let mut grid = Grid::from_matrix(&Matrix::from_rows(&[[1, 2], [3, 4], [5, 6]]).unwrap());
        grid.swap_rows(2, 0);
        assert_eq!(grid.data, vec![5, 6, 3, 4, 1, 2]);
        grid.swap_rows(0, 2);
        grid.swap_rows(1, 1);
        assert_eq!(grid.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn pivot_selection_prefers_largest_magnitude() {
        let grid = Grid::from_matrix(&m(&[&[1.0, 0.0], &[-7.0, 1.0], &[7.0, 2.0]]));
        assert_eq!(grid.pivot_row(0, 0), 1);
        assert_eq!(grid.pivot_row(0, 1), 2);
    }

    #[test]
    fn determinant_tracks_row_swaps() {
        assert_abs_diff_eq!(determinant(&m(&[&[0.0, 1.0], &[1.0, 0.0]])), -1.0);
        assert_abs_diff_eq!(determinant(&m(&[&[1.0, 2.0], &[3.0, 4.0]])), -2.0, epsilon = 1e-12);
        let upper = m(&[&[2.0, 1.0, 1.0], &[0.0, 3.0, 1.0], &[0.0, 0.0, 4.0]]);
        assert_abs_diff_eq!(determinant(&upper), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn determinant_of_singular_is_zero() {
        assert_abs_diff_eq!(determinant(&m(&[&[1.0, 2.0], &[2.0, 4.0]])), 0.0);
        assert_abs_diff_eq!(determinant(&Matrix::<f64>::zero(3, 3)), 0.0);
    }

    #[test]
    fn bareiss_matches_cofactor_expansion() {
        let a = Matrix::from_rows(&[[2_i64, -3, 1], [2, 0, -1], [1, 4, 5]]).unwrap();
        assert_eq!(determinant_bareiss(&a), 49);

        let needs_swap = Matrix::from_rows(&[[0_i32, 1], [1, 0]]).unwrap();
        assert_eq!(determinant_bareiss(&needs_swap), -1);

        let singular = Matrix::from_rows(&[[1_i32, 2], [2, 4]]).unwrap();
        assert_eq!(determinant_bareiss(&singular), 0);

        assert_eq!(determinant_bareiss(&Matrix::from_rows(&[[-5_i32]]).unwrap()), -5);
    }

    #[test]
    fn tolerance_flags_near_singular() {
        let nearly = m(&[&[1.0, 1.0], &[1.0, 1.0 + 1e-15]]);
        assert!(Elimination::exact().inverse(&nearly).is_ok());
        assert_eq!(
            Elimination::default().inverse(&nearly),
            Err(LinalgError::SingularMatrix { pivot_column: 1 })
        );
        assert_eq!(Elimination::default().rank(&nearly), 1);
        assert_eq!(Elimination::exact().rank(&nearly), 2);
    }

    #[test]
    fn tolerance_is_relative_to_scale() {
        let tiny = m(&[&[1e-20, 0.0], &[0.0, 2e-20]]);
        let inv = Elimination::default().inverse(&tiny).unwrap();
        assert_relative_eq!(inv[(0, 0)], 1e20, max_relative = 1e-12);
        assert_relative_eq!(inv[(1, 1)], 5e19, max_relative = 1e-12);
    }

    #[test]
    fn solve_uses_augmented_column() {
        let a = m(&[&[2.0, 1.0], &[1.0, 3.0]]);
        let x = Elimination::default().solve(&a, &Vector::from([3.0, 5.0])).unwrap();
        assert_abs_diff_eq!(x, Vector::from([0.8, 1.4]), epsilon = 1e-12);
    }

    #[test]
    fn rank_of_rectangular() {
        let a = m(&[&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]]);
        assert_eq!(Elimination::default().rank(&a), 1);
        let b = m(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
        assert_eq!(Elimination::default().rank(&b), 2);
        assert_eq!(Elimination::default().rank(&Matrix::<f64>::zero(2, 3)), 0);
    }

    #[test]
    fn nan_pivot_is_singular() {
        let nan_pivot = m(&[&[f64::NAN]]);
        assert_eq!(
            Elimination::default().inverse(&nan_pivot),
            Err(LinalgError::SingularMatrix { pivot_column: 0 })
        );
        assert!(Elimination::exact().solve(&nan_pivot, &Vector::from([1.0])).is_err());
        assert_eq!(Elimination::default().rank(&nan_pivot), 0);

        let nan_first = m(&[&[f64::NAN, 1.0], &[1.0, 1.0]]);
        for elimination in [Elimination::default(), Elimination::exact()] {
            assert!(matches!(
                elimination.inverse(&nan_first),
                Err(LinalgError::SingularMatrix { .. })
            ));
            assert!(elimination.solve(&nan_first, &Vector::from([1.0, 2.0])).is_err());
        }
    }

    #[test]
    fn nan_off_pivot_is_singular() {
        let a = m(&[&[1.0, f64::NAN], &[0.0, 1.0]]);
        assert_eq!(
            Elimination::default().inverse(&a),
            Err(LinalgError::SingularMatrix { pivot_column: 1 })
        );
        assert!(Elimination::default().solve(&a, &Vector::from([1.0, 1.0])).is_err());
    }

    #[test]
    fn nan_threshold_rejects_every_pivot() {
        assert!(negligible(1.0, f64::NAN));
        assert!(negligible(f64::NAN, 0.0));
        assert!(negligible(1e-20, 1e-20));
        assert!(!negligible(-2.0, 1.0));
        // infinite scale with exact tolerance gives a NaN threshold
        let a = m(&[&[f64::INFINITY, 0.0], &[0.0, 1.0]]);
        assert!(Elimination::exact().inverse(&a).is_err());
    }

    #[test]
    #[should_panic(expected = "tolerance must be non-negative")]
    fn negative_tolerance_rejected() {
        let _ = Elimination::new(-1.0_f64);
    }
}
