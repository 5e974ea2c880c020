use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};
use num_traits::{PrimInt, Signed};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::elimination::{determinant, determinant_bareiss};
use super::{compensated_dot, Elimination, Field, Scalar, Vector};
use crate::error::{LinalgError, ShapeError};

/// Products with at least this many multiply-adds are split across rows on
/// the rayon pool. Smaller ones stay on the calling thread.
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 64 * 64 * 64;

/// Dense `rows x cols` matrix, stored row-major, indexed `(row, col)` from zero.
///
/// The shape is fixed at construction and is never empty. Shape errors on the
/// operators are contract violations and panic; the `checked_*` methods
/// return them instead.
///
/// ```
/// use alumine::Matrix;
///
/// let a: Matrix<f64> = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let b = Matrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
/// assert_eq!(&a * &b, Matrix::from_rows(&[[19.0, 22.0], [43.0, 50.0]]).unwrap());
/// assert!((a.determinant() + 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Build a `rows x cols` matrix from a generator `f(row, col)`.
    ///
    /// # Panics
    /// Panics with [`ShapeError::Empty`] if either dimension is zero.
    #[track_caller]
    pub fn new<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        if rows == 0 || cols == 0 {
            ShapeError::Empty.raise();
        }
        let data = (0..rows * cols).map(|i| f(i / cols, i % cols)).collect();
        Self { rows, cols, data }
    }

    /// Wrap row-major data.
    ///
    /// # Errors
    /// [`ShapeError::Empty`] for a zero dimension, [`ShapeError::DataLength`]
    /// if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, ShapeError> {
        if rows == 0 || cols == 0 {
            return Err(ShapeError::Empty);
        }
        if data.len() != rows * cols {
            return Err(ShapeError::DataLength { rows, cols, found: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether `rows == cols`.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Entries in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Give back the row-major storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow one row.
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`.
    #[track_caller]
    pub fn row_slice(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {row} out of range for {} rows", self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate over the rows as slices.
    pub fn row_iter(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.cols)
    }

    #[inline]
    fn expect_same_shape(&self, other: &Self, op: &'static str) -> Result<(), ShapeError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(ShapeError::ShapeMismatch { op, left: self.shape(), right: other.shape() })
        }
    }
}

impl<T: Clone> Matrix<T> {
    /// Build from a literal grid of rows.
    ///
    /// # Errors
    /// [`ShapeError::Empty`] for no rows or empty rows, [`ShapeError::Ragged`]
    /// when rows differ in length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if cols == 0 {
            return Err(ShapeError::Empty);
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(ShapeError::Ragged { row: i, expected: cols, found: row.len() });
            }
            data.extend_from_slice(row);
        }

        Ok(Self { rows: rows.len(), cols, data })
    }

    /// Stack vectors as the rows of a matrix.
    ///
    /// # Errors
    /// Same as [`Matrix::from_rows`].
    pub fn from_row_vectors(rows: &[Vector<T>]) -> Result<Self, ShapeError> {
        Self::from_rows(rows)
    }

    /// `1 x n` matrix holding `v`.
    ///
    /// # Panics
    /// Panics with [`ShapeError::Empty`] if `v` is empty.
    #[track_caller]
    pub fn from_row(v: &Vector<T>) -> Self {
        Self::new(1, v.dim(), |_, c| v[c].clone())
    }

    /// `n x 1` matrix holding `v`.
    ///
    /// # Panics
    /// Panics with [`ShapeError::Empty`] if `v` is empty.
    #[track_caller]
    pub fn from_col(v: &Vector<T>) -> Self {
        Self::new(v.dim(), 1, |r, _| v[r].clone())
    }

    /// Copy of row `row` as a vector.
    #[track_caller]
    pub fn row(&self, row: usize) -> Vector<T> {
        Vector::from_slice(self.row_slice(row))
    }

    /// Copy of column `col` as a vector.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    #[track_caller]
    pub fn col(&self, col: usize) -> Vector<T> {
        assert!(col < self.cols, "column {col} out of range for {} columns", self.cols);
        self.data.iter().skip(col).step_by(self.cols).cloned().collect()
    }

    /// Matrix with rows and columns exchanged.
    pub fn transpose(&self) -> Self {
        Self::new(self.cols, self.rows, |r, c| self[(c, r)].clone())
    }

    /// Flatten a single-row or single-column matrix.
    ///
    /// # Errors
    /// [`ShapeError::NotAVector`] otherwise.
    pub fn to_vector(&self) -> Result<Vector<T>, ShapeError> {
        if self.rows == 1 || self.cols == 1 {
            Ok(Vector::from_slice(&self.data))
        } else {
            Err(ShapeError::NotAVector { rows: self.rows, cols: self.cols })
        }
    }
}

impl<T: Scalar> Matrix<T> {
    /// Zero matrix of the given shape.
    #[track_caller]
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, |_, _| T::zero())
    }

    /// `n x n` identity.
    #[track_caller]
    pub fn identity(n: usize) -> Self {
        Self::new(n, n, |r, c| if r == c { T::one() } else { T::zero() })
    }

    /// Square matrix with `diag` on the main diagonal.
    #[track_caller]
    pub fn diagonal(diag: &Vector<T>) -> Self {
        Self::new(diag.dim(), diag.dim(), |r, c| if r == c { diag[r] } else { T::zero() })
    }

    /// Sum of the diagonal.
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] for non-square matrices.
    #[track_caller]
    pub fn trace(&self) -> T {
        if !self.is_square() {
            ShapeError::NotSquare { rows: self.rows, cols: self.cols }.raise();
        }
        (0..self.rows).fold(T::zero(), |acc, i| acc + self[(i, i)])
    }

    /// Elementwise sum, or `ShapeMismatch`.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ShapeError> {
        self.expect_same_shape(other, "add")?;
        Ok(self.zip_map(other, |a, b| a + b))
    }

    /// Elementwise difference, or `ShapeMismatch`.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ShapeError> {
        self.expect_same_shape(other, "sub")?;
        Ok(self.zip_map(other, |a, b| a - b))
    }

    /// Matrix product, or `ShapeMismatch` unless `self.cols() == other.rows()`.
    ///
    /// Each entry is the compensated dot product of a row of `self` and a
    /// column of `other`. With the `rayon` feature, large products fill rows in
    /// parallel; every entry is computed the same way, so results are
    /// identical to the serial path.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, ShapeError> {
        if self.cols != other.rows {
            return Err(ShapeError::ShapeMismatch {
                op: "mul",
                left: self.shape(),
                right: other.shape(),
            });
        }

        let (rows, cols) = (self.rows, other.cols);
        let mut data = vec![T::zero(); rows * cols];
        let fill = |r: usize, out: &mut [T]| {
            let lhs = self.row_slice(r);
            for (c, cell) in out.iter_mut().enumerate() {
                let column = other.data.iter().skip(c).step_by(other.cols).copied();
                *cell = compensated_dot(lhs.iter().copied().zip(column));
            }
        };

        #[cfg(feature = "rayon")]
        if rows * cols * self.cols >= PARALLEL_THRESHOLD {
            data.par_chunks_mut(cols).enumerate().for_each(|(r, out)| fill(r, out));
            return Ok(Self { rows, cols, data });
        }

        data.chunks_mut(cols).enumerate().for_each(|(r, out)| fill(r, out));
        Ok(Self { rows, cols, data })
    }

    /// Matrix-vector product, or `ShapeMismatch` unless
    /// `self.cols() == v.dim()`. The result has `self.rows()` entries.
    pub fn checked_mul_vector(&self, v: &Vector<T>) -> Result<Vector<T>, ShapeError> {
        if self.cols != v.dim() {
            return Err(ShapeError::ShapeMismatch {
                op: "mul",
                left: self.shape(),
                right: (v.dim(), 1),
            });
        }
        Ok(self
            .row_iter()
            .map(|row| compensated_dot(row.iter().copied().zip(v.iter().copied())))
            .collect())
    }

    /// Multiply every entry by `scalar`.
    pub fn scale(&self, scalar: T) -> Self {
        self.map(|a| a * scalar)
    }

    /// Multiply every entry by `scalar` in place.
    pub fn scale_mut(&mut self, scalar: T) {
        for a in &mut self.data {
            *a = *a * scalar;
        }
    }

    /// Divide every entry by `scalar`.
    ///
    /// # Errors
    /// [`LinalgError::DivisionByZero`] when `scalar` is zero.
    pub fn div_scalar(&self, scalar: T) -> Result<Self, LinalgError> {
        if scalar.is_zero() {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(self.map(|a| a / scalar))
    }

    fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&a| f(a)).collect(),
        }
    }

    fn zip_map(&self, other: &Self, f: impl Fn(T, T) -> T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl<T: Field> Matrix<T> {
    /// Determinant by Gaussian elimination with partial pivoting.
    ///
    /// A singular matrix has determinant zero; that is not an error.
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] for non-square matrices.
    #[track_caller]
    pub fn determinant(&self) -> T {
        determinant(self)
    }

    /// Inverse with the default tolerance, see [`Elimination`].
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] when no inverse exists.
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] for non-square matrices.
    #[track_caller]
    pub fn inverse(&self) -> Result<Self, LinalgError> {
        self.inverse_with(&Elimination::default())
    }

    /// Inverse with an explicit tolerance.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] when no inverse exists.
    #[track_caller]
    pub fn inverse_with(&self, elimination: &Elimination<T>) -> Result<Self, LinalgError> {
        elimination.inverse(self)
    }

    /// Replace `self` by its inverse. On error `self` is left untouched.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] when no inverse exists.
    #[track_caller]
    pub fn invert_mut(&mut self) -> Result<(), LinalgError> {
        *self = self.inverse()?;
        Ok(())
    }

    /// Solve `self * x = b` with the default tolerance.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] when `self` is singular.
    #[track_caller]
    pub fn solve(&self, b: &Vector<T>) -> Result<Vector<T>, LinalgError> {
        self.solve_with(b, &Elimination::default())
    }

    /// Solve `self * x = b` with an explicit tolerance.
    ///
    /// # Errors
    /// [`LinalgError::SingularMatrix`] when `self` is singular.
    #[track_caller]
    pub fn solve_with(&self, b: &Vector<T>, elimination: &Elimination<T>) -> Result<Vector<T>, LinalgError> {
        elimination.solve(self, b)
    }

    /// Rank with the default tolerance.
    pub fn rank(&self) -> usize {
        self.rank_with(&Elimination::default())
    }

    /// Rank with an explicit tolerance.
    pub fn rank_with(&self, elimination: &Elimination<T>) -> usize {
        elimination.rank(self)
    }
}

impl<T: Scalar + PrimInt + Signed> Matrix<T> {
    /// Exact determinant of an integer matrix (fraction-free elimination).
    ///
    /// # Panics
    /// Panics with [`ShapeError::NotSquare`] for non-square matrices, and on
    /// overflow of `T` in debug builds.
    #[track_caller]
    pub fn determinant_exact(&self) -> T {
        determinant_bareiss(self)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of range for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

// --- Operators ---------------------------------------------------------------

impl<T: Scalar> Add for &Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn add(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.checked_add(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Add for Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn add(self, rhs: Matrix<T>) -> Matrix<T> {
        &self + &rhs
    }
}

impl<T: Scalar> Sub for &Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn sub(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.checked_sub(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Sub for Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn sub(self, rhs: Matrix<T>) -> Matrix<T> {
        &self - &rhs
    }
}

impl<T: Scalar> AddAssign<&Matrix<T>> for Matrix<T> {
    #[track_caller]
    fn add_assign(&mut self, rhs: &Matrix<T>) {
        if let Err(e) = self.expect_same_shape(rhs, "add") {
            e.raise();
        }
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a + b;
        }
    }
}

impl<T: Scalar> SubAssign<&Matrix<T>> for Matrix<T> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: &Matrix<T>) {
        if let Err(e) = self.expect_same_shape(rhs, "sub") {
            e.raise();
        }
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a - b;
        }
    }
}

impl<T: Scalar> Mul for &Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn mul(self, rhs: &Matrix<T>) -> Matrix<T> {
        self.checked_mul(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Mul for Matrix<T> {
    type Output = Matrix<T>;

    #[track_caller]
    fn mul(self, rhs: Matrix<T>) -> Matrix<T> {
        &self * &rhs
    }
}

impl<T: Scalar> Mul<&Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;

    #[track_caller]
    fn mul(self, rhs: &Vector<T>) -> Vector<T> {
        self.checked_mul_vector(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, scalar: T) -> Matrix<T> {
        self.scale(scalar)
    }
}

impl<T: Scalar> Mul<T> for Matrix<T> {
    type Output = Matrix<T>;

    fn mul(mut self, scalar: T) -> Matrix<T> {
        self.scale_mut(scalar);
        self
    }
}

/// Scalar division yields a `Result`: a zero divisor is a domain outcome.
impl<T: Scalar> Div<T> for &Matrix<T> {
    type Output = Result<Matrix<T>, LinalgError>;

    fn div(self, scalar: T) -> Self::Output {
        self.div_scalar(scalar)
    }
}

impl<T: Scalar> Div<T> for Matrix<T> {
    type Output = Result<Matrix<T>, LinalgError>;

    fn div(self, scalar: T) -> Self::Output {
        self.div_scalar(scalar)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.map(|a| -a)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(mut self) -> Matrix<T> {
        for a in &mut self.data {
            *a = -*a;
        }
        self
    }
}

// --- Approximate equality --------------------------------------------------

impl<T> AbsDiffEq for Matrix<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> T::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T::Epsilon) -> bool {
        self.shape() == other.shape()
            && self.data.iter().zip(&other.data).all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T> RelativeEq for Matrix<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> T::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T::Epsilon, max_relative: T::Epsilon) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.row_iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (c, a) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                a.fmt(f)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
