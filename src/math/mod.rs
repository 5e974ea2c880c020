//! Dense linear algebra over generic scalars.
//!
//! # Scalars
//! Arithmetic on [`Vector`] and [`Matrix`] only needs a commutative ring with an
//! ordering, which is what [`Scalar`] captures: `i64` and `f64` both qualify.
//! Pivoting elimination (determinant, inverse, solve, rank) and the Euclidean
//! norm additionally need division and a square root, i.e. a field with a
//! floating-point model. That is [`Field`], a thin layer over
//! `num-traits::Float`.
//!
//! Integer matrices are not silently pushed through division-based
//! elimination. They get an exact fraction-free determinant instead, see
//! [`Matrix::determinant_exact`].

use num_traits::{Float, FromPrimitive, Num};
use std::fmt::Debug;

mod elimination;
mod matrix;
mod vector;

pub use elimination::Elimination;
pub use matrix::Matrix;
pub use vector::Vector;

/// Number of machine epsilons in the default singularity tolerance.
///
/// A pivot is treated as zero when `|pivot| <= DEFAULT_TOLERANCE_ULPS * eps * scale`,
/// where `scale` is the largest absolute entry of the input matrix.
pub const DEFAULT_TOLERANCE_ULPS: usize = 64;

/// Scalar ring usable as a vector or matrix entry.
///
/// Blanket-implemented for every `Copy` numeric type from `num-traits`.
pub trait Scalar: Num + Copy + PartialOrd + Debug + Send + Sync {}

impl<T> Scalar for T where T: Num + Copy + PartialOrd + Debug + Send + Sync {}

/// Scalar field with a floating-point model.
pub trait Field: Scalar + Float + FromPrimitive {
    /// Relative tolerance used to decide that a pivot is numerically zero.
    #[inline]
    fn default_tolerance() -> Self {
        Self::epsilon() * Self::from_usize_exact(DEFAULT_TOLERANCE_ULPS)
    }

    /// Convert `usize` to the scalar field.
    /// Panics on overflow.
    #[inline(always)]
    fn from_usize_exact(u: usize) -> Self {
        <Self as FromPrimitive>::from_usize(u).expect("usize-to-float conversion failed")
    }
}

impl<F> Field for F where F: Scalar + Float + FromPrimitive {}

/// Sum of pairwise products with Kahan compensation.
///
/// For exact scalars the compensation term stays zero and this is a plain sum.
/// Once the running sum overflows, the compensation is dropped so the result
/// stays `±inf` as with plain summation, instead of turning into NaN.
#[inline]
pub(crate) fn compensated_dot<T, I>(pairs: I) -> T
where
    T: Scalar,
    I: IntoIterator<Item = (T, T)>,
{
    let mut sum = T::zero();
    let mut c = T::zero();

    for (a, b) in pairs {
        let y = a * b - c;
        let t = sum + y;
        let next = (t - sum) - y;
        c = if is_finite(next) { next } else { T::zero() };
        sum = t;
    }

    sum
}

/// `x * 0` is zero for every finite value and NaN for `±inf` or NaN.
#[inline(always)]
fn is_finite<T: Scalar>(x: T) -> bool {
    (x * T::zero()).is_zero()
}
