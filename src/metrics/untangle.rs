use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::metrics::check_parameter;
use crate::tensor::{cofactor, determinant, TensorDim};
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use numeric_literals::replace_float_literals;

/// The untangling metric.
///
/// $$
/// \mu(T) = \left( |\tau - \varepsilon| - (\tau - \varepsilon) \right)^3.
/// $$
/// It vanishes identically for $\tau \geq \varepsilon$ and grows cubically as $\tau$ drops below
/// $\varepsilon$. Minimizing it pushes inverted elements back to a positive determinant without
/// caring about their shape. It is twice continuously differentiable, including at
/// $\tau = \varepsilon$.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UntangleBeta<T> {
    epsilon: T,
}

impl<T: Real> Default for UntangleBeta<T> {
    fn default() -> Self {
        Self { epsilon: T::zero() }
    }
}

impl<T: Real> UntangleBeta<T> {
    pub const NAME: &'static str = "UntangleBeta";

    /// Creates the metric with determinant threshold `epsilon`, which must be finite.
    pub fn new(epsilon: T) -> Result<Self, MetricError<T>> {
        check_parameter(Self::NAME, "epsilon", epsilon, epsilon.is_finite(), "must be finite")?;
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> T {
        self.epsilon
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for UntangleBeta<T>
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
        let s = determinant(t) - self.epsilon;
        let d = s.abs() - s;
        Ok(d * d * d)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let s = determinant(t) - self.epsilon;
        if s >= 0.0 {
            return Ok((0.0, OMatrix::<T, D, D>::zeros()));
        }
        let d = s.abs() - s;
        let value = d * d * d;
        let grad = cofactor(t) * (-24.0 * s * s);
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let s = determinant(t) - self.epsilon;
        if s >= 0.0 {
            return Ok((0.0, OMatrix::<T, D, D>::zeros(), SymmetricHessian::zeros()));
        }
        let d = s.abs() - s;
        let value = d * d * d;
        let cof = cofactor(t);
        let grad = &cof * (-24.0 * s * s);

        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_outer_product(-48.0 * s, &cof);
        hess.add_scaled_determinant_hessian(-24.0 * s * s, t);
        Ok((value, grad, hess))
    }
}
