//! proptest strategies for tensors.
//!
//! Tensors with a prescribed range of singular values are built as $U \Sigma V^T$ from random
//! rotations $U$ and $V$, so their determinant is the product of the diagonal of $\Sigma$.
//! This gives direct control over which side of the barrier a tensor lies on.
use crate::allocators::TensorAllocator;
use crate::tensor::TensorDim;
use ::proptest::prelude::*;
use nalgebra::{DefaultAllocator, Matrix2, Matrix3, OMatrix, Rotation2, Rotation3, Vector2, Vector3};
use std::f64::consts::PI;
use std::ops::Range;

pub fn rotation2() -> impl Strategy<Value = Matrix2<f64>> {
    (-PI..PI).prop_map(|angle| Rotation2::new(angle).into_inner())
}

pub fn rotation3() -> impl Strategy<Value = Matrix3<f64>> {
    [-PI..PI, -PI / 2.0..PI / 2.0, -PI..PI]
        .prop_map(|[roll, pitch, yaw]| Rotation3::from_euler_angles(roll, pitch, yaw).into_inner())
}

/// 2x2 tensors $U \operatorname{diag}(\sigma_1, \sigma_2) V^T$ with $\sigma_i$ drawn from `singular_values`.
///
/// With a positive range, every generated tensor has a positive determinant.
pub fn tensor2_with_singular_values(singular_values: Range<f64>) -> impl Strategy<Value = Matrix2<f64>> {
    let sigma = [singular_values.clone(), singular_values];
    (rotation2(), rotation2(), sigma)
        .prop_map(|(u, v, [s1, s2])| u * Matrix2::from_diagonal(&Vector2::new(s1, s2)) * v.transpose())
}

/// 3x3 tensors $U \operatorname{diag}(\sigma_1, \sigma_2, \sigma_3) V^T$ with $\sigma_i$ drawn from
/// `singular_values`.
pub fn tensor3_with_singular_values(singular_values: Range<f64>) -> impl Strategy<Value = Matrix3<f64>> {
    let sigma = [singular_values.clone(), singular_values.clone(), singular_values];
    (rotation3(), rotation3(), sigma)
        .prop_map(|(u, v, [s1, s2, s3])| u * Matrix3::from_diagonal(&Vector3::new(s1, s2, s3)) * v.transpose())
}

/// 2x2 tensors with negative determinant, i.e. inverted elements.
///
/// The magnitudes of the singular values are drawn from `singular_values`, which should be
/// positive.
pub fn inverted_tensor2(singular_values: Range<f64>) -> impl Strategy<Value = Matrix2<f64>> {
    let sigma = [singular_values.clone(), singular_values];
    (rotation2(), rotation2(), sigma)
        .prop_map(|(u, v, [s1, s2])| u * Matrix2::from_diagonal(&Vector2::new(s1, -s2)) * v.transpose())
}

/// 3x3 tensors with negative determinant, i.e. inverted elements.
pub fn inverted_tensor3(singular_values: Range<f64>) -> impl Strategy<Value = Matrix3<f64>> {
    let sigma = [singular_values.clone(), singular_values.clone(), singular_values];
    (rotation3(), rotation3(), sigma)
        .prop_map(|(u, v, [s1, s2, s3])| u * Matrix3::from_diagonal(&Vector3::new(s1, s2, -s3)) * v.transpose())
}

/// 2x2 tensors close to singular: one singular value has its magnitude drawn from
/// `smallest` and a random sign, the other is drawn from `singular_values`.
///
/// Tensors on both sides of $\tau = 0$ are generated, which makes this suitable for non-barrier
/// metrics only.
pub fn near_singular_tensor2(
    singular_values: Range<f64>,
    smallest: Range<f64>,
) -> impl Strategy<Value = Matrix2<f64>> {
    (rotation2(), rotation2(), singular_values, smallest, any::<bool>()).prop_map(|(u, v, s1, s2, inverted)| {
        let s2 = if inverted { -s2 } else { s2 };
        u * Matrix2::from_diagonal(&Vector2::new(s1, s2)) * v.transpose()
    })
}

/// 3x3 tensors close to singular, see [`near_singular_tensor2`].
pub fn near_singular_tensor3(
    singular_values: Range<f64>,
    smallest: Range<f64>,
) -> impl Strategy<Value = Matrix3<f64>> {
    let sigma = [singular_values.clone(), singular_values];
    (rotation3(), rotation3(), sigma, smallest, any::<bool>()).prop_map(|(u, v, [s1, s2], s3, inverted)| {
        let s3 = if inverted { -s3 } else { s3 };
        u * Matrix3::from_diagonal(&Vector3::new(s1, s2, s3)) * v.transpose()
    })
}

/// Tensors with entries drawn independently from `entries`.
pub fn arbitrary_tensor<D>(entries: Range<f64>) -> impl Strategy<Value = OMatrix<f64, D, D>>
where
    D: TensorDim,
    DefaultAllocator: TensorAllocator<f64, D>,
{
    let n = D::dim();
    ::proptest::collection::vec(entries, n * n).prop_map(|values| OMatrix::<f64, D, D>::from_column_slice(&values))
}
