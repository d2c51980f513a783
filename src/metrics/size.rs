use crate::allocators::TensorAllocator;
use crate::barrier::barrier_determinant;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::tensor::{cofactor, determinant, TensorDim};
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use numeric_literals::replace_float_literals;

/// The size barrier metric $\mu(T) = \tau + 1/\tau - 2$.
///
/// Depends on $T$ only through its determinant, so it controls the element's volume and nothing
/// else. Zero exactly when $\tau = 1$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeB1;

impl SizeB1 {
    pub const NAME: &'static str = "SizeB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for SizeB1
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
        Ok(tau + 1.0 / tau - 2.0)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let value = tau + 1.0 / tau - 2.0;
        let grad = cofactor(t) * (1.0 - 1.0 / (tau * tau));
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let value = tau + 1.0 / tau - 2.0;
        let cof = cofactor(t);
        let dmu_dtau = 1.0 - 1.0 / (tau * tau);
        let grad = &cof * dmu_dtau;

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_outer_product(2.0 / (tau * tau * tau), &cof);
        hess.add_scaled_determinant_hessian(dmu_dtau, t);
        Ok((value, grad, hess))
    }
}

/// The non-barrier size metric $\mu(T) = (\tau - 1)^2$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeNB1;

impl SizeNB1 {
    pub const NAME: &'static str = "SizeNB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for SizeNB1
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
        let size = determinant(t) - 1.0;
        Ok(size * size)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let size = determinant(t) - 1.0;
        let grad = cofactor(t) * (2.0 * size);
        Ok((size * size, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let size = determinant(t) - 1.0;
        let cof = cofactor(t);
        let grad = &cof * (2.0 * size);

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_outer_product(2.0, &cof);
        hess.add_scaled_determinant_hessian(2.0 * size, t);
        Ok((size * size, grad, hess))
    }
}
