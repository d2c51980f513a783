use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{Matrix2, Matrix3, U3};
use tmetric::metrics::{ShapeOrientB2, ShapeSizeNB1};
use tmetric::TargetMetric;

#[test]
fn shape_orient_b2_at_identity_2d() {
    let t = Matrix2::<f64>::identity();
    let (value, grad, hess) = ShapeOrientB2.evaluate_with_hess(&t).unwrap();
    assert_eq!(value, 0.0);
    assert_matrix_eq!(grad, Matrix2::zeros(), comp = abs, tol = 1e-15);
    // At the minimum the Hessian is positive semi-definite
    let eigenvalues = hess.to_dense().symmetric_eigenvalues();
    assert!(eigenvalues.iter().all(|&lambda| lambda >= -1e-12));
}

#[test]
fn shape_size_nb1_at_scaled_identity_3d() {
    let t = Matrix3::<f64>::identity() * 2.0;
    let metric = ShapeSizeNB1::<f64>::new(2.0).unwrap();

    // |T| = 2 sqrt(3) and tau = 8: |T|^3 - 3 sqrt(3) tau cancels and gamma (tau - 1)^2 = 98
    let norm = 2.0 * 3.0f64.sqrt();
    let expected = norm.powi(3) - 3.0 * 3.0f64.sqrt() * 8.0 + 2.0 * 49.0;
    let value = TargetMetric::<f64, U3>::evaluate(&metric, &t).unwrap();
    assert_scalar_eq!(value, expected, comp = abs, tol = 1e-12);
    assert_scalar_eq!(value, 98.0, comp = abs, tol = 1e-12);

    // The default weight is the same
    let default_value = TargetMetric::<f64, U3>::evaluate(&ShapeSizeNB1::<f64>::default(), &t).unwrap();
    assert_eq!(value, default_value);
}
