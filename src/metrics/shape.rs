use crate::barrier::barrier_determinant;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::tensor::{cofactor, determinant, frobenius_norm, frobenius_norm_squared};
use crate::Real;
use nalgebra::{OMatrix, U2, U3};
use numeric_literals::replace_float_literals;

/// The shape barrier metric.
///
/// In 2D,
/// $$
/// \mu(T) = \frac{|T|^2}{2 \tau} - 1,
/// $$
/// and in 3D,
/// $$
/// \mu(T) = \frac{|T|^3}{3 \sqrt{3} \tau} - 1.
/// $$
/// Both are invariant to scaling and rotation of $T$ and attain their minimum $0$ exactly
/// when $T$ is a positive multiple of a rotation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeB1;

impl ShapeB1 {
    pub const NAME: &'static str = "ShapeB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U2> for ShapeB1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, U2, U2>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        Ok(n / (2.0 * tau) - 1.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U2, U2>) -> Result<(T, OMatrix<T, U2, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let value = n / (2.0 * tau) - 1.0;

        let cof = cofactor(t);
        let grad = t / tau - cof * (n / (2.0 * tau * tau));
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U2, U2>,
    ) -> Result<(T, OMatrix<T, U2, U2>, SymmetricHessian<T, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let value = n / (2.0 * tau) - 1.0;

        let cof = cofactor(t);
        let grad = t / tau - &cof * (n / (2.0 * tau * tau));

        let tau2 = tau * tau;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(1.0 / tau);
        hess.add_scaled_sum_outer_product(-1.0 / tau2, t, &cof);
        hess.add_scaled_outer_product(n / (tau2 * tau), &cof);
        hess.add_scaled_determinant_hessian(-n / (2.0 * tau2), t);
        Ok((value, grad, hess))
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U3> for ShapeB1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, U3, U3>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let norm = frobenius_norm(t);
        Ok(norm * norm * norm / (3.0 * 3.0.sqrt() * tau) - 1.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U3, U3>) -> Result<(T, OMatrix<T, U3, U3>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let norm = frobenius_norm(t);
        let norm3 = norm * norm * norm;
        let value = norm3 / (3.0 * 3.0.sqrt() * tau) - 1.0;

        let a = 1.0 / 3.0.sqrt();
        let cof = cofactor(t);
        let grad = t * (a * norm / tau) - cof * (a * norm3 / (3.0 * tau * tau));
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U3, U3>,
    ) -> Result<(T, OMatrix<T, U3, U3>, SymmetricHessian<T, U3>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let norm = frobenius_norm(t);
        let norm3 = norm * norm * norm;
        let value = norm3 / (3.0 * 3.0.sqrt() * tau) - 1.0;

        let a = 1.0 / 3.0.sqrt();
        let cof = cofactor(t);
        let grad = t * (a * norm / tau) - &cof * (a * norm3 / (3.0 * tau * tau));

        // A positive determinant implies a non-zero norm
        let tau2 = tau * tau;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_outer_product(a / (norm * tau), t);
        hess.add_scaled_identity(a * norm / tau);
        hess.add_scaled_sum_outer_product(-a * norm / tau2, t, &cof);
        hess.add_scaled_outer_product(2.0 * a * norm3 / (3.0 * tau2 * tau), &cof);
        hess.add_scaled_determinant_hessian(-a * norm3 / (3.0 * tau2), t);
        Ok((value, grad, hess))
    }
}

/// The non-barrier shape metric.
///
/// In 2D,
/// $$
/// \mu(T) = |T|^2 - 2 \tau,
/// $$
/// and in 3D,
/// $$
/// \mu(T) = |T|^3 - 3 \sqrt{3} \tau.
/// $$
/// These are the numerators of [`ShapeB1`] shifted so that the minimum is $0$. They are
/// defined for inverted tensors, which makes them suitable for untangling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeNB1;

impl ShapeNB1 {
    pub const NAME: &'static str = "ShapeNB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U2> for ShapeNB1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, U2, U2>) -> Result<T, MetricError<T>> {
        let tau = determinant(t);
        Ok(frobenius_norm_squared(t) - 2.0 * tau)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U2, U2>) -> Result<(T, OMatrix<T, U2, U2>), MetricError<T>> {
        let tau = determinant(t);
        let value = frobenius_norm_squared(t) - 2.0 * tau;
        let grad = (t - cofactor(t)) * 2.0;
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U2, U2>,
    ) -> Result<(T, OMatrix<T, U2, U2>, SymmetricHessian<T, U2>), MetricError<T>> {
        let tau = determinant(t);
        let value = frobenius_norm_squared(t) - 2.0 * tau;
        let grad = (t - cofactor(t)) * 2.0;

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0);
        hess.add_scaled_determinant_hessian(-2.0, t);
        Ok((value, grad, hess))
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U3> for ShapeNB1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, U3, U3>) -> Result<T, MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        Ok(norm * norm * norm - 3.0 * 3.0.sqrt() * tau)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U3, U3>) -> Result<(T, OMatrix<T, U3, U3>), MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        let value = norm * norm * norm - 3.0 * 3.0.sqrt() * tau;
        let grad = t * (3.0 * norm) - cofactor(t) * (3.0 * 3.0.sqrt());
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U3, U3>,
    ) -> Result<(T, OMatrix<T, U3, U3>, SymmetricHessian<T, U3>), MetricError<T>> {
        let tau = determinant(t);
        let norm = frobenius_norm(t);
        let value = norm * norm * norm - 3.0 * 3.0.sqrt() * tau;
        let grad = t * (3.0 * norm) - cofactor(t) * (3.0 * 3.0.sqrt());

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(3.0 * norm);
        // The T (x) T / |T| term vanishes in the limit T -> 0
        if norm > 0.0 {
            hess.add_scaled_outer_product(3.0 / norm, t);
        }
        hess.add_scaled_determinant_hessian(-3.0 * 3.0.sqrt(), t);
        Ok((value, grad, hess))
    }
}

/// The inverse mean ratio metric.
///
/// $$
/// \mu(T) = \frac{|T|^2}{N \tau^{2/N}} - 1,
/// $$
/// i.e. the arithmetic mean of the squared singular values of $T$ divided by their geometric
/// mean, minus one. In 2D it coincides with [`ShapeB1`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InverseMeanRatio;

impl InverseMeanRatio {
    pub const NAME: &'static str = "InverseMeanRatio";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U2> for InverseMeanRatio {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, U2, U2>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        Ok(frobenius_norm_squared(t) / (2.0 * tau) - 1.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U2, U2>) -> Result<(T, OMatrix<T, U2, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let value = n / (2.0 * tau) - 1.0;
        let grad = (t - cofactor(t) * (n / (2.0 * tau))) / tau;
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U2, U2>,
    ) -> Result<(T, OMatrix<T, U2, U2>, SymmetricHessian<T, U2>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let n = frobenius_norm_squared(t);
        let value = n / (2.0 * tau) - 1.0;
        let cof = cofactor(t);
        let grad = (t - &cof * (n / (2.0 * tau))) / tau;

        let inv_tau = 1.0 / tau;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(inv_tau);
        hess.add_scaled_sum_outer_product(-inv_tau * inv_tau, t, &cof);
        hess.add_scaled_outer_product(n * inv_tau * inv_tau * inv_tau, &cof);
        hess.add_scaled_determinant_hessian(-0.5 * n * inv_tau * inv_tau, t);
        Ok((value, grad, hess))
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T: Real> TargetMetric<T, U3> for InverseMeanRatio {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, U3, U3>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let cbrt_tau = tau.cbrt();
        Ok(frobenius_norm_squared(t) / (3.0 * cbrt_tau * cbrt_tau) - 1.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, U3, U3>) -> Result<(T, OMatrix<T, U3, U3>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let cbrt_tau = tau.cbrt();
        let n = frobenius_norm_squared(t);
        let value = n / (3.0 * cbrt_tau * cbrt_tau) - 1.0;

        // c = tau^(-2/3)
        let c = 1.0 / (cbrt_tau * cbrt_tau);
        let grad = (t * 2.0 - cofactor(t) * (2.0 * n / (3.0 * tau))) * (c / 3.0);
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, U3, U3>,
    ) -> Result<(T, OMatrix<T, U3, U3>, SymmetricHessian<T, U3>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let cbrt_tau = tau.cbrt();
        let n = frobenius_norm_squared(t);
        let value = n / (3.0 * cbrt_tau * cbrt_tau) - 1.0;

        let c = 1.0 / (cbrt_tau * cbrt_tau);
        let cof = cofactor(t);
        let grad = (t * 2.0 - &cof * (2.0 * n / (3.0 * tau))) * (c / 3.0);

        let c3 = c / 3.0;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0 * c3);
        hess.add_scaled_sum_outer_product(-4.0 * c3 / (3.0 * tau), t, &cof);
        hess.add_scaled_outer_product(10.0 * c3 * n / (9.0 * tau * tau), &cof);
        hess.add_scaled_determinant_hessian(-2.0 * c3 * n / (3.0 * tau), t);
        Ok((value, grad, hess))
    }
}
