//! Generic dense vectors and matrices.
//!
//! [`Vector`] and [`Matrix`] are value types over any [`Scalar`]; operations
//! allocate and return new values, with explicitly named in-place variants
//! (`+=`, `scale_mut`, `invert_mut`). Determinant, inverse, solve and rank use
//! pivoting elimination and require a [`Field`] scalar (`f32`, `f64`);
//! integer matrices get an exact determinant instead.
//!
//! Failures come in two kinds, see [`error`]: shape mismatches are caller bugs
//! and panic on the operator forms, while singular matrices and zero divisors
//! are returned as [`LinalgError`].
//!
//! ```
//! use alumine::{Matrix, Vector, LinalgError};
//!
//! let a: Matrix<f64> = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
//! let inv = a.inverse().unwrap();
//! assert!((inv[(1, 0)] - 1.5).abs() < 1e-12);
//!
//! let x = a.solve(&Vector::from([5.0, 11.0])).unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 2.0).abs() < 1e-12);
//!
//! let singular = Matrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
//! assert!(matches!(singular.inverse(), Err(LinalgError::SingularMatrix { .. })));
//! ```

pub mod error;
mod math;
mod display;

pub use error::{LinalgError, ShapeError};
pub use math::*;
