use crate::barrier::barrier_determinant;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::metrics::check_parameter;
use crate::tensor::{cofactor, determinant, frobenius_norm, frobenius_norm_squared};
use crate::Real;
use nalgebra::{OMatrix, U2, U3};
use numeric_literals::replace_float_literals;

/// The non-barrier shape and size metric.
///
/// The [`ShapeNB1`](crate::metrics::ShapeNB1) shape term plus a size penalty,
/// $$
/// \mu(T) = |T|^2 - 2 \tau + \gamma (\tau - 1)^2
/// $$
/// in 2D and
/// $$
/// \mu(T) = |T|^3 - 3 \sqrt{3} \tau + \gamma (\tau - 1)^2
/// $$
/// in 3D, with weight $\gamma \geq 0$.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShapeSizeNB1<T> {
    gamma: T,
}

impl<T: Real> Default for ShapeSizeNB1<T> {
    fn default() -> Self {
        Self {
            gamma: T::from_f64(Self::DEFAULT_GAMMA).expect("literal must fit in T"),
        }
    }
}

impl<T: Real> ShapeSizeNB1<T> {
    pub const NAME: &'static str = "ShapeSizeNB1";
    pub const DEFAULT_GAMMA: f64 = 2.0;

    /// Creates the metric with size weight `gamma`, which must be finite and non-negative.
    pub fn new(gamma: T) -> Result<Self, MetricError<T>> {
        check_parameter(
            Self::NAME,
            "gamma",
            gamma,
            gamma.is_finite() && gamma >= T::zero(),
            "must be finite and non-negative",
        )?;
        Ok(Self { gamma })
    }

    pub fn gamma(&self) -> T {
        self.gamma
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U2> for ShapeSizeNB1<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, U2, U2>) -> Result<T, MetricError<T>> {
        let tau = determinant(t);
        let size = tau - 1.0;
        Ok(frobenius_norm_squared(t) - 2.0 * tau + self.gamma * size * size)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U2, U2>) -> Result<(T, OMatrix<T, U2, U2>), MetricError<T>> {
        let tau = determinant(t);
        let size = tau - 1.0;
        let value = frobenius_norm_squared(t) - 2.0 * tau + self.gamma * size * size;
        let grad = t * 2.0 + cofactor(t) * (2.0 * self.gamma * size - 2.0);
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U2, U2>,
    ) -> Result<(T, OMatrix<T, U2, U2>, SymmetricHessian<T, U2>), MetricError<T>> {
        let tau = determinant(t);
        let size = tau - 1.0;
        let value = frobenius_norm_squared(t) - 2.0 * tau + self.gamma * size * size;
        let cof = cofactor(t);
        let grad = t * 2.0 + &cof * (2.0 * self.gamma * size - 2.0);

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0);
        hess.add_scaled_outer_product(2.0 * self.gamma, &cof);
        hess.add_scaled_determinant_hessian(2.0 * self.gamma * size - 2.0, t);
        Ok((value, grad, hess))
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U3> for ShapeSizeNB1<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, U3, U3>) -> Result<T, MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        let size = tau - 1.0;
        Ok(norm * norm * norm - 3.0 * 3.0.sqrt() * tau + self.gamma * size * size)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U3, U3>) -> Result<(T, OMatrix<T, U3, U3>), MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        let size = tau - 1.0;
        let value = norm * norm * norm - 3.0 * 3.0.sqrt() * tau + self.gamma * size * size;
        let grad = t * (3.0 * norm) + cofactor(t) * (2.0 * self.gamma * size - 3.0 * 3.0.sqrt());
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U3, U3>,
    ) -> Result<(T, OMatrix<T, U3, U3>, SymmetricHessian<T, U3>), MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        let size = tau - 1.0;
        let value = norm * norm * norm - 3.0 * 3.0.sqrt() * tau + self.gamma * size * size;
        let cof = cofactor(t);
        let det_coeff = 2.0 * self.gamma * size - 3.0 * 3.0.sqrt();
        let grad = t * (3.0 * norm) + &cof * det_coeff;

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(3.0 * norm);
        if norm > 0.0 {
            hess.add_scaled_outer_product(3.0 / norm, t);
        }
        hess.add_scaled_outer_product(2.0 * self.gamma, &cof);
        hess.add_scaled_determinant_hessian(det_coeff, t);
        Ok((value, grad, hess))
    }
}

/// The 2D shape and size barrier metric.
///
/// $$
/// \mu(T) = |T|^2 (1 + \tau^{-2}) - 4.
/// $$
/// Zero exactly when $T$ is a rotation. Only defined for 2x2 tensors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeSize2DB1;

impl ShapeSize2DB1 {
    pub const NAME: &'static str = "ShapeSize2DB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U2> for ShapeSize2DB1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, U2, U2>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        Ok(frobenius_norm_squared(t) * (1.0 + 1.0 / (tau * tau)) - 4.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U2, U2>) -> Result<(T, OMatrix<T, U2, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let inv_tau2 = 1.0 / (tau * tau);
        let value = n * (1.0 + inv_tau2) - 4.0;
        let grad = t * (2.0 * (1.0 + inv_tau2)) - cofactor(t) * (2.0 * n * inv_tau2 / tau);
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U2, U2>,
    ) -> Result<(T, OMatrix<T, U2, U2>, SymmetricHessian<T, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let inv_tau2 = 1.0 / (tau * tau);
        let inv_tau3 = inv_tau2 / tau;
        let value = n * (1.0 + inv_tau2) - 4.0;
        let cof = cofactor(t);
        let grad = t * (2.0 * (1.0 + inv_tau2)) - &cof * (2.0 * n * inv_tau3);

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0 * (1.0 + inv_tau2));
        hess.add_scaled_sum_outer_product(-4.0 * inv_tau3, t, &cof);
        hess.add_scaled_outer_product(6.0 * n * inv_tau3 / tau, &cof);
        hess.add_scaled_determinant_hessian(-2.0 * n * inv_tau3, t);
        Ok((value, grad, hess))
    }
}
