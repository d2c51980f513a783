//! Evaluation of a single metric at many tensors.
//!
//! An optimizer typically evaluates the same metric at every sample point of every element.
//! These helpers return one result per tensor, in input order, so that a barrier violation at one
//! sample point does not hide the results at the others.
use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::metric::TargetMetric;
use crate::tensor::TensorDim;
use crate::Real;
use log::debug;
use nalgebra::{DefaultAllocator, OMatrix};
use rayon::prelude::*;

/// Evaluates `metric` at each tensor sequentially.
pub fn evaluate_all<T, D, M>(metric: &M, tensors: &[OMatrix<T, D, D>]) -> Vec<Result<T, MetricError<T>>>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
{
    tensors.iter().map(|t| metric.evaluate(t)).collect()
}

/// Evaluates `metric` at each tensor in parallel.
///
/// The results are identical to those of [`evaluate_all`].
pub fn par_evaluate_all<T, D, M>(metric: &M, tensors: &[OMatrix<T, D, D>]) -> Vec<Result<T, MetricError<T>>>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
    OMatrix<T, D, D>: Send + Sync,
{
    debug!("Evaluating {} at {} tensors in parallel", metric.name(), tensors.len());
    let mut results = Vec::new();
    tensors
        .par_iter()
        .map(|t| metric.evaluate(t))
        .collect_into_vec(&mut results);
    results
}

/// Evaluates `metric` and its gradient at each tensor in parallel.
pub fn par_evaluate_all_with_grad<T, D, M>(
    metric: &M,
    tensors: &[OMatrix<T, D, D>],
) -> Vec<Result<(T, OMatrix<T, D, D>), MetricError<T>>>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
    OMatrix<T, D, D>: Send + Sync,
{
    debug!(
        "Evaluating {} with gradients at {} tensors in parallel",
        metric.name(),
        tensors.len()
    );
    let mut results = Vec::new();
    tensors
        .par_iter()
        .map(|t| metric.evaluate_with_grad(t))
        .collect_into_vec(&mut results);
    results
}

/// Sums the metric over all tensors, or returns one of the errors if any evaluation fails.
///
/// This is the objective value of an optimizer that weighs all sample points equally. The
/// summation order depends on the thread pool, so the result may differ from a sequential sum
/// in the last bits.
pub fn par_sum<T, D, M>(metric: &M, tensors: &[OMatrix<T, D, D>]) -> Result<T, MetricError<T>>
where
    T: Real,
    D: TensorDim,
    M: TargetMetric<T, D> + ?Sized,
    DefaultAllocator: TensorAllocator<T, D>,
    OMatrix<T, D, D>: Send + Sync,
{
    tensors
        .par_iter()
        .map(|t| metric.evaluate(t))
        .try_reduce(T::zero, |a, b| Ok(a + b))
}
