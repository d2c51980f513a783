use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{matrix, Matrix2, Matrix3, U2, U3};
use proptest::prelude::*;
use tmetric::proptest::arbitrary_tensor;
use tmetric::tensor::{adjugate, cofactor, determinant, frobenius_norm, trace, try_inverse};
use tmetric::SymmetricHessian;
use tmetric_calculus::calculus::{approximate_tensor_gradient_fd, approximate_tensor_hessian_fd};

#[test]
fn determinant_and_cofactor_2d() {
    let t = matrix![1.0, 2.0;
                    3.0, 4.0];
    assert_eq!(determinant(&t), -2.0);
    assert_eq!(cofactor(&t), matrix![4.0, -3.0; -2.0, 1.0]);
    assert_eq!(adjugate(&t), matrix![4.0, -2.0; -3.0, 1.0]);
}

#[test]
fn determinant_and_cofactor_3d() {
    let t = matrix![2.0, 0.0, 1.0;
                    1.0, 3.0, 0.0;
                    0.0, 1.0, 4.0];
    assert_scalar_eq!(determinant(&t), t.determinant(), comp = float);
    assert_matrix_eq!(t * adjugate(&t), Matrix3::identity() * determinant(&t), comp = float);
    assert_eq!(trace(&t), 9.0);
    assert_eq!(frobenius_norm(&Matrix3::<f64>::identity()), 3.0f64.sqrt());
}

#[test]
fn try_inverse_of_singular_tensor_is_none() {
    let t = matrix![1.0, 2.0;
                    2.0, 4.0];
    assert!(try_inverse(&t).is_none());

    let t = matrix![2.0, 1.0;
                    0.0, 1.0];
    let inverse = try_inverse(&t).unwrap();
    assert_matrix_eq!(t * inverse, Matrix2::identity(), comp = float);
}

proptest! {
    #[test]
    fn cofactor_2d_is_derivative_of_determinant(t in arbitrary_tensor::<U2>(-2.0..2.0)) {
        let cof_fd = approximate_tensor_gradient_fd(|t: &Matrix2<f64>| determinant(t), &t, 1e-6);
        assert_matrix_eq!(cofactor(&t), cof_fd, comp = abs, tol = 1e-6);
    }

    #[test]
    fn cofactor_3d_is_derivative_of_determinant(t in arbitrary_tensor::<U3>(-2.0..2.0)) {
        let cof_fd = approximate_tensor_gradient_fd(|t: &Matrix3<f64>| determinant(t), &t, 1e-6);
        assert_matrix_eq!(cofactor(&t), cof_fd, comp = abs, tol = 1e-6);
        assert_scalar_eq!(determinant(&t), t.determinant(), comp = abs, tol = 1e-12);
    }

    #[test]
    fn determinant_hessian_3d_is_derivative_of_cofactor(t in arbitrary_tensor::<U3>(-2.0..2.0)) {
        let mut hessian = SymmetricHessian::<f64, U3>::zeros();
        hessian.add_scaled_determinant_hessian(1.0, &t);

        let hessian_fd = approximate_tensor_hessian_fd(|t: &Matrix3<f64>| cofactor(t), &t, 1e-6);
        assert_matrix_eq!(hessian.to_dense(), hessian_fd, comp = abs, tol = 1e-6);
    }

    #[test]
    fn determinant_hessian_2d_is_derivative_of_cofactor(t in arbitrary_tensor::<U2>(-2.0..2.0)) {
        let mut hessian = SymmetricHessian::<f64, U2>::zeros();
        hessian.add_scaled_determinant_hessian(2.0, &t);

        let hessian_fd = approximate_tensor_hessian_fd(|t: &Matrix2<f64>| cofactor(t) * 2.0, &t, 1e-6);
        assert_matrix_eq!(hessian.to_dense(), hessian_fd, comp = abs, tol = 1e-6);
    }
}
