//! The evaluation contract shared by all target metrics.
use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::tensor::TensorDim;
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use serde::{Deserialize, Serialize};

/// Behavior of a metric as the tensor approaches singularity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Defined only for $\tau = \det T > 0$ and unbounded as $\tau \to 0^+$.
    ///
    /// Evaluation fails with [`MetricError::BarrierViolated`] when $\tau$ is not safely positive.
    Barrier,
    /// Finite and differentiable for every tensor, including inverted ones.
    NonBarrier,
}

impl MetricKind {
    pub fn is_barrier(&self) -> bool {
        *self == MetricKind::Barrier
    }

    /// The kind of a metric built from two terms: a single barrier term makes the whole
    /// metric a barrier metric.
    pub fn combine(self, other: Self) -> Self {
        if self.is_barrier() || other.is_barrier() {
            MetricKind::Barrier
        } else {
            MetricKind::NonBarrier
        }
    }
}

/// A target-matrix quality metric $\mu(T)$ for $N \times N$ tensors, $N$ given by `D`.
///
/// Here $T$ is the Jacobian of the actual element relative to its target (ideal) shape at a
/// single sample point. The three evaluation methods return increasingly more information:
///
/// - [`evaluate`](Self::evaluate) returns $\mu(T)$,
/// - [`evaluate_with_grad`](Self::evaluate_with_grad) additionally returns $\pd{\mu}{T}$,
/// - [`evaluate_with_hess`](Self::evaluate_with_hess) additionally returns $\pd{^2 \mu}{T^2}$.
///
/// Implementations must return the same value from all three methods, and the same gradient
/// from the two richer methods. Each method computes only what it returns.
///
/// Metrics are immutable after construction and therefore `Send + Sync`: a single instance
/// may be evaluated from any number of threads.
pub trait TargetMetric<T, D>: Send + Sync
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    /// A short, human-readable name of the metric.
    fn name(&self) -> &'static str;

    fn kind(&self) -> MetricKind;

    /// Evaluates the metric at `t`.
    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>>;

    /// Evaluates the metric and its gradient with respect to `t`.
    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>>;

    /// Evaluates the metric, its gradient and its Hessian with respect to `t`.
    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>>;
}

impl<'a, T, D, M> TargetMetric<T, D> for &'a M
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        M::name(self)
    }

    fn kind(&self) -> MetricKind {
        M::kind(self)
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        M::evaluate(self, t)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        M::evaluate_with_grad(self, t)
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        M::evaluate_with_hess(self, t)
    }
}

impl<T, D, M> TargetMetric<T, D> for Box<M>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        M::name(self)
    }

    fn kind(&self) -> MetricKind {
        M::kind(self)
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        M::evaluate(self, t)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        M::evaluate_with_grad(self, t)
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        M::evaluate_with_hess(self, t)
    }
}
