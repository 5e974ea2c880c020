//! Public API tests for vectors and matrices.
//!
//! ## Test Organization
//!
//! 1. **Scenarios** - Worked examples with known answers
//! 2. **Error Kinds** - Shape violations versus domain outcomes
//! 3. **Composition** - Least squares through the normal equations

use approx::{assert_abs_diff_eq, assert_relative_eq};

use alumine::{Elimination, LinalgError, Matrix, ShapeError, Vector};

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_vector_scenario() {
    let a = Vector::from([1, 2, 3]);
    let b = Vector::from([4, 5, 6]);

    assert_eq!(&a + &b, Vector::from([5, 7, 9]));
    assert_eq!(a.dot(&b), 32);
    assert_abs_diff_eq!(Vector::from([3.0_f32, 4.0]).norm(), 5.0, epsilon = 1e-6);
}

#[test]
fn test_matrix_scenario() {
    let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();

    assert_eq!(&a * &b, Matrix::from_rows(&[[19.0, 22.0], [43.0, 50.0]]).unwrap());
    assert_abs_diff_eq!(a.determinant(), -2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        a.inverse().unwrap(),
        Matrix::from_rows(&[[-2.0, 1.0], [1.5, -0.5]]).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_single_precision_inverse() {
    let a = Matrix::from_rows(&[[4.0_f32, 7.0], [2.0, 6.0]]).unwrap();
    let product = &a * &a.inverse().unwrap();
    assert_abs_diff_eq!(product, Matrix::identity(2), epsilon = 1e-5);
}

// ============================================================================
// Error Kinds
// ============================================================================

#[test]
fn test_shape_violations_are_distinct_from_domain_outcomes() {
    let a = Matrix::<f64>::identity(2);
    let tall = Matrix::<f64>::zero(3, 2);

    let shape: ShapeError = a.checked_mul(&tall).unwrap_err();
    assert!(matches!(shape, ShapeError::ShapeMismatch { .. }));

    let domain: LinalgError = (&a / 0.0).unwrap_err();
    assert_eq!(domain, LinalgError::DivisionByZero);

    let singular = Matrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
    assert!(matches!(singular.inverse(), Err(LinalgError::SingularMatrix { .. })));
}

#[test]
fn test_overridden_tolerance() {
    let nearly = Matrix::from_rows(&[[1.0, 1.0], [1.0, 1.0 + 1e-10]]).unwrap();

    assert!(nearly.inverse().is_ok());
    assert!(nearly.inverse_with(&Elimination::new(1e-8)).is_err());
}

// ============================================================================
// Composition
// ============================================================================

/// Fit `y = slope * x + offset` with `(XᵀX)⁻¹ Xᵀ y`.
#[test]
fn test_least_squares_through_normal_equations() {
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
    let ys: Vector<f64> = xs.iter().map(|x| 2.5 * x - 1.0).collect();

    let design = Matrix::from_row_vectors(
        &xs.iter().map(|&x| Vector::from([x, 1.0])).collect::<Vec<_>>(),
    )
    .unwrap();
    let xt = design.transpose();

    let coefficients = &(&(&xt * &design).inverse().unwrap() * &xt) * &ys;
    assert_relative_eq!(coefficients[0], 2.5, epsilon = 1e-10);
    assert_relative_eq!(coefficients[1], -1.0, epsilon = 1e-10);

    let solved = (&xt * &design).solve(&(&xt * &ys)).unwrap();
    assert_abs_diff_eq!(solved, coefficients, epsilon = 1e-10);
}
