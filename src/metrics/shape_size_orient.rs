use crate::allocators::TensorAllocator;
use crate::barrier::barrier_determinant;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::tensor::{cofactor, frobenius_norm_squared, TensorDim};
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use numeric_literals::replace_float_literals;

/// The shape, size and orientation barrier metric.
///
/// $$
/// \mu(T) = \frac{|T - I|^2}{2 \tau}.
/// $$
/// Zero exactly at $T = I$, i.e. when the element matches its target completely.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeSizeOrientB1;

impl ShapeSizeOrientB1 {
    pub const NAME: &'static str = "ShapeSizeOrientB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for ShapeSizeOrientB1
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let deviation = t - OMatrix::<T, D, D>::identity();
        Ok(frobenius_norm_squared(&deviation) / (2.0 * tau))
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let deviation = t - OMatrix::<T, D, D>::identity();
        let w = frobenius_norm_squared(&deviation);
        let value = w / (2.0 * tau);
        let grad = deviation / tau - cofactor(t) * (w / (2.0 * tau * tau));
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let deviation = t - OMatrix::<T, D, D>::identity();
        let w = frobenius_norm_squared(&deviation);
        let value = w / (2.0 * tau);
        let cof = cofactor(t);
        let grad = &deviation / tau - &cof * (w / (2.0 * tau * tau));

        let tau2 = tau * tau;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(1.0 / tau);
        hess.add_scaled_sum_outer_product(-1.0 / tau2, &deviation, &cof);
        hess.add_scaled_outer_product(w / (tau2 * tau), &cof);
        hess.add_scaled_determinant_hessian(-w / (2.0 * tau2), t);
        Ok((value, grad, hess))
    }
}

/// The non-barrier shape, size and orientation metric $\mu(T) = |T - I|^2$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeSizeOrientNB1;

impl ShapeSizeOrientNB1 {
    pub const NAME: &'static str = "ShapeSizeOrientNB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for ShapeSizeOrientNB1
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        Ok(frobenius_norm_squared(&(t - OMatrix::<T, D, D>::identity())))
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let deviation = t - OMatrix::<T, D, D>::identity();
        Ok((frobenius_norm_squared(&deviation), deviation * 2.0))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let deviation = t - OMatrix::<T, D, D>::identity();
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0);
        Ok((frobenius_norm_squared(&deviation), deviation * 2.0, hess))
    }
}
