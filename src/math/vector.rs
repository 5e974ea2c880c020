use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};
use num_traits::ToPrimitive;

use super::{compensated_dot, Field, Scalar};
use crate::error::{LinalgError, ShapeError};

/// Fixed-dimension column vector.
///
/// The dimension is set at construction and never changes. Binary operations
/// require equal dimensions: the operators panic on a mismatch, the
/// `checked_*` methods return [`ShapeError::DimensionMismatch`].
///
/// ```
/// use alumine::Vector;
///
/// let a = Vector::from([1, 2, 3]);
/// let b = Vector::from([4, 5, 6]);
/// assert_eq!(&a + &b, Vector::from([5, 7, 9]));
/// assert_eq!(a.dot(&b), 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T> Vector<T> {
    /// Build a vector of dimension `n` from a generator `f(i)`.
    pub fn new<F>(n: usize, f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        Self { data: (0..n).map(f).collect() }
    }

    /// Take ownership of raw components.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Number of components.
    #[inline]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    /// Check if the vector has no components
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Component at `i`, or `None` when out of range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// Iterate over the components in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Give back the underlying storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn expect_same_dim(&self, other: &Self) -> Result<(), ShapeError> {
        if self.dim() == other.dim() {
            Ok(())
        } else {
            Err(ShapeError::DimensionMismatch { left: self.dim(), right: other.dim() })
        }
    }
}

impl<T: Clone> Vector<T> {
    /// Copy components out of a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self { data: data.to_vec() }
    }

    /// `n` copies of `value`.
    pub fn from_copies(n: usize, value: T) -> Self {
        Self { data: vec![value; n] }
    }
}

impl<T: Scalar> Vector<T> {
    /// Zero vector of dimension `n`.
    pub fn zero(n: usize) -> Self {
        Self::from_copies(n, T::zero())
    }

    /// Standard basis vector `e_axis` of dimension `n`.
    ///
    /// # Panics
    /// Panics if `axis >= n`.
    pub fn unit(n: usize, axis: usize) -> Self {
        assert!(axis < n, "basis axis {axis} out of range for dimension {n}");
        Self::new(n, |i| if i == axis { T::one() } else { T::zero() })
    }

    /// Elementwise sum, or `DimensionMismatch`.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ShapeError> {
        self.expect_same_dim(other)?;
        Ok(self.zip_map(other, |a, b| a + b))
    }

    /// Elementwise difference, or `DimensionMismatch`.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ShapeError> {
        self.expect_same_dim(other)?;
        Ok(self.zip_map(other, |a, b| a - b))
    }

    /// Dot product, or `DimensionMismatch`.
    ///
    /// Accumulation is Kahan-compensated, so long floating-point sums drift
    /// less than a naive loop; integer results are exact.
    pub fn checked_dot(&self, other: &Self) -> Result<T, ShapeError> {
        self.expect_same_dim(other)?;
        Ok(compensated_dot(self.data.iter().copied().zip(other.data.iter().copied())))
    }

    /// Dot product.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn dot(&self, other: &Self) -> T {
        self.checked_dot(other).unwrap_or_else(|e| e.raise())
    }

    /// Squared Euclidean norm, exact for integer scalars.
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }

    /// Multiply every component by `scalar`.
    pub fn scale(&self, scalar: T) -> Self {
        self.map(|a| a * scalar)
    }

    /// Multiply every component by `scalar` in place.
    pub fn scale_mut(&mut self, scalar: T) {
        for a in &mut self.data {
            *a = *a * scalar;
        }
    }

    /// Divide every component by `scalar`.
    ///
    /// # Errors
    /// [`LinalgError::DivisionByZero`] when `scalar` is zero, whatever `T` is.
    pub fn div_scalar(&self, scalar: T) -> Result<Self, LinalgError> {
        if scalar.is_zero() {
            return Err(LinalgError::DivisionByZero);
        }
        Ok(self.map(|a| a / scalar))
    }

    fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self { data: self.data.iter().map(|&a| f(a)).collect() }
    }

    fn zip_map(&self, other: &Self, f: impl Fn(T, T) -> T) -> Self {
        Self {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl<T: Scalar + ToPrimitive> Vector<T> {
    /// Euclidean norm promoted to `f64`.
    ///
    /// Meant for integer vectors, whose norm is generally irrational. Squares
    /// are accumulated in `f64`, so this does not overflow `T`. Returns `None`
    /// if a component has no `f64` representation.
    pub fn norm_f64(&self) -> Option<f64> {
        let mut sum = 0.0_f64;
        for a in &self.data {
            let x = a.to_f64()?;
            sum += x * x;
        }
        Some(sum.sqrt())
    }
}

impl<T: Field> Vector<T> {
    /// Euclidean norm `sqrt(v · v)`.
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// # Errors
    /// [`LinalgError::DivisionByZero`] for the zero vector.
    pub fn normalize(&self) -> Result<Self, LinalgError> {
        self.div_scalar(self.norm())
    }
}

// --- Conversions -----------------------------------------------------------

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(array: [T; N]) -> Self {
        Self { data: array.into() }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { data: iter.into_iter().collect() }
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

// --- Operators ---------------------------------------------------------------

impl<T: Scalar> Add for &Vector<T> {
    type Output = Vector<T>;

    #[track_caller]
    fn add(self, rhs: &Vector<T>) -> Vector<T> {
        self.checked_add(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Add for Vector<T> {
    type Output = Vector<T>;

    #[track_caller]
    fn add(self, rhs: Vector<T>) -> Vector<T> {
        &self + &rhs
    }
}

impl<T: Scalar> Sub for &Vector<T> {
    type Output = Vector<T>;

    #[track_caller]
    fn sub(self, rhs: &Vector<T>) -> Vector<T> {
        self.checked_sub(rhs).unwrap_or_else(|e| e.raise())
    }
}

impl<T: Scalar> Sub for Vector<T> {
    type Output = Vector<T>;

    #[track_caller]
    fn sub(self, rhs: Vector<T>) -> Vector<T> {
        &self - &rhs
    }
}

impl<T: Scalar> AddAssign<&Vector<T>> for Vector<T> {
    #[track_caller]
    fn add_assign(&mut self, rhs: &Vector<T>) {
        if let Err(e) = self.expect_same_dim(rhs) {
            e.raise();
        }
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a + b;
        }
    }
}

impl<T: Scalar> SubAssign<&Vector<T>> for Vector<T> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: &Vector<T>) {
        if let Err(e) = self.expect_same_dim(rhs) {
            e.raise();
        }
        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a = *a - b;
        }
    }
}

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, scalar: T) -> Vector<T> {
        self.scale(scalar)
    }
}

impl<T: Scalar> Mul<T> for Vector<T> {
    type Output = Vector<T>;

    fn mul(mut self, scalar: T) -> Vector<T> {
        self.scale_mut(scalar);
        self
    }
}

/// Scalar division yields a `Result`: a zero divisor is a domain outcome.
impl<T: Scalar> Div<T> for &Vector<T> {
    type Output = Result<Vector<T>, LinalgError>;

    fn div(self, scalar: T) -> Self::Output {
        self.div_scalar(scalar)
    }
}

impl<T: Scalar> Div<T> for Vector<T> {
    type Output = Result<Vector<T>, LinalgError>;

    fn div(self, scalar: T) -> Self::Output {
        self.div_scalar(scalar)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for &Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        self.map(|a| -a)
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        -&self
    }
}

// --- Approximate equality --------------------------------------------------

impl<T> AbsDiffEq for Vector<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = T::Epsilon;

    fn default_epsilon() -> T::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T::Epsilon) -> bool {
        self.data.len() == other.data.len()
            && self.data.iter().zip(&other.data).all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T> RelativeEq for Vector<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> T::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T::Epsilon, max_relative: T::Epsilon) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl<T: fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, a) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            a.fmt(f)?;
        }
        write!(f, "]")
    }
}
