//! Error taxonomy.
//!
//! Two kinds of failure, kept apart by type:
//!
//! - [`ShapeError`]: operands whose shapes cannot be combined. This is a caller
//!   bug. Operator forms (`&a + &b`, `&m * &v`, ...) panic with the error's
//!   message, `checked_*` forms hand it back.
//! - [`LinalgError`]: outcomes that valid inputs can legitimately produce, such
//!   as a singular matrix or a zero divisor. These are always returned, never
//!   panicked on and never replaced by a default value.

use thiserror::Error;

/// Incompatible operand shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Two vectors of different dimension were combined.
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch {
        /// Dimension of the left operand.
        left: usize,
        /// Dimension of the right operand.
        right: usize,
    },

    /// Matrix (or matrix/vector) shapes are incompatible for `op`.
    #[error("matrix shape mismatch in {op}: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    ShapeMismatch {
        /// Operation that was attempted.
        op: &'static str,
        /// `(rows, cols)` of the left operand.
        left: (usize, usize),
        /// `(rows, cols)` of the right operand; a vector reports `(dim, 1)`.
        right: (usize, usize),
    },

    /// A square matrix was required.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Literal grid with rows of unequal length.
    #[error("ragged matrix literal: row {row} has {found} entries, expected {expected}")]
    Ragged {
        /// Offending row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// Flat data whose length is not `rows * cols`.
    #[error("matrix data length mismatch: got {found} elements, expected {rows}x{cols}")]
    DataLength {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
        /// Supplied element count.
        found: usize,
    },

    /// A matrix needs at least one row and one column.
    #[error("matrix must have at least one row and one column")]
    Empty,

    /// Conversion to a vector requires a single row or a single column.
    #[error("matrix is not single-row or single-column: {rows}x{cols}")]
    NotAVector {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
}

impl ShapeError {
    /// Panics with this error as the message.
    ///
    /// Used by the operator impls, which cannot return a `Result`.
    #[cold]
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        panic!("{self}")
    }
}

/// Domain outcomes of otherwise valid operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// No usable pivot was found in `pivot_column`; the matrix has no inverse.
    #[error("matrix is singular (no pivot in column {pivot_column})")]
    SingularMatrix {
        /// Column in which elimination ran out of nonzero entries.
        pivot_column: usize,
    },

    /// Division by the additive identity.
    #[error("division by zero")]
    DivisionByZero,
}
