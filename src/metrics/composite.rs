//! Metrics built from other metrics.
//!
//! Composites forward to their inner metrics and combine the results with the sum, product and
//! chain rules. A barrier violation in any inner metric is propagated unchanged. Combining
//! finite results may still overflow, in which case the composite fails with
//! [`MetricError::NonFiniteResult`].
use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::metrics::{check_finite, check_finite_entries, check_parameter};
use crate::tensor::TensorDim;
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use numeric_literals::replace_float_literals;

fn hessian_entries<T, D>(hess: &SymmetricHessian<T, D>) -> impl Iterator<Item = &T>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    hess.upper_blocks().iter().flat_map(|block| block.iter())
}

/// The sum $\mu(T) = \mu_1(T) + \mu_2(T)$ of two metrics.
///
/// The sum is a barrier metric if either term is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sum<A, B> {
    first: A,
    second: B,
}

impl<A, B> Sum<A, B> {
    pub const NAME: &'static str = "Sum";

    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<T, D, A, B> TargetMetric<T, D> for Sum<A, B>
where
    T: Real,
    D: TensorDim,
    A: TargetMetric<T, D>,
    B: TargetMetric<T, D>,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        self.first.kind().combine(self.second.kind())
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        check_finite(Self::NAME, self.first.evaluate(t)? + self.second.evaluate(t)?)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let (value1, grad1) = self.first.evaluate_with_grad(t)?;
        let (value2, grad2) = self.second.evaluate_with_grad(t)?;
        let grad = grad1 + grad2;
        check_finite_entries(Self::NAME, grad.iter())?;
        Ok((check_finite(Self::NAME, value1 + value2)?, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let (value1, grad1, mut hess) = self.first.evaluate_with_hess(t)?;
        let (value2, grad2, hess2) = self.second.evaluate_with_hess(t)?;
        hess.add_scaled(T::one(), &hess2);
        let grad = grad1 + grad2;
        check_finite_entries(Self::NAME, grad.iter().chain(hessian_entries(&hess)))?;
        Ok((check_finite(Self::NAME, value1 + value2)?, grad, hess))
    }
}

/// A metric multiplied by a positive weight, $\mu(T) = \alpha \mu_0(T)$.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Scale<T, M> {
    alpha: T,
    metric: M,
}

impl<T: Real, M> Scale<T, M> {
    pub const NAME: &'static str = "Scale";

    /// Scales `metric` by `alpha`, which must be finite and positive.
    pub fn new(alpha: T, metric: M) -> Result<Self, MetricError<T>> {
        check_parameter(
            Self::NAME,
            "alpha",
            alpha,
            alpha.is_finite() && alpha > T::zero(),
            "must be finite and positive",
        )?;
        Ok(Self { alpha, metric })
    }

    pub fn alpha(&self) -> T {
        self.alpha
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }
}

impl<T, D, M> TargetMetric<T, D> for Scale<T, M>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D>,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        self.metric.kind()
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        check_finite(Self::NAME, self.alpha * self.metric.evaluate(t)?)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let (value, grad) = self.metric.evaluate_with_grad(t)?;
        let grad = grad * self.alpha;
        check_finite_entries(Self::NAME, grad.iter())?;
        Ok((check_finite(Self::NAME, self.alpha * value)?, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let (value, grad, mut hess) = self.metric.evaluate_with_hess(t)?;
        hess.scale_mut(self.alpha);
        let grad = grad * self.alpha;
        check_finite_entries(Self::NAME, grad.iter().chain(hessian_entries(&hess)))?;
        Ok((check_finite(Self::NAME, self.alpha * value)?, grad, hess))
    }
}

/// The square of a metric, $\mu(T) = \mu_0(T)^2$.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Squared<M> {
    metric: M,
}

impl<M> Squared<M> {
    pub const NAME: &'static str = "Squared";

    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D, M> TargetMetric<T, D> for Squared<M>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D>,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        self.metric.kind()
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        let value = self.metric.evaluate(t)?;
        check_finite(Self::NAME, value * value)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let (value, grad) = self.metric.evaluate_with_grad(t)?;
        let squared_grad = grad * (2.0 * value);
        check_finite_entries(Self::NAME, squared_grad.iter())?;
        Ok((check_finite(Self::NAME, value * value)?, squared_grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let (value, grad, mut hess) = self.metric.evaluate_with_hess(t)?;
        // d^2 (f^2) = 2 f d^2 f + 2 df (x) df
        hess.scale_mut(2.0 * value);
        hess.add_scaled_outer_product(2.0, &grad);
        let squared_grad = grad * (2.0 * value);
        check_finite_entries(Self::NAME, squared_grad.iter().chain(hessian_entries(&hess)))?;
        Ok((check_finite(Self::NAME, value * value)?, squared_grad, hess))
    }
}
