//! The domain check shared by all barrier metrics.
//!
//! Barrier metrics are only defined for tensors with strictly positive determinant and blow up
//! as $\tau \to 0^+$. Evaluating them, or worse their derivatives, close to $\tau = 0$ would
//! feed huge or non-finite numbers into the optimizer's linear systems, so every barrier metric
//! first checks $\tau$ against [`barrier_threshold`] and fails before computing anything else.
use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::tensor::TensorDim;
use crate::Real;
use log::trace;
use nalgebra::{DefaultAllocator, OMatrix};

/// Determinants below this value are treated as zero by barrier metrics in double precision.
pub const MIN_BARRIER_DETERMINANT: f64 = 1e-12;

/// The smallest determinant at which barrier metrics over `T` may be evaluated.
///
/// This is [`MIN_BARRIER_DETERMINANT`], raised to the machine epsilon of `T` for scalars with
/// less precision than `f64`. Barrier derivatives scale with up to $\tau^{-4}$, which overflows
/// single precision long before $\tau$ reaches `1e-12`.
pub fn barrier_threshold<T: Real>() -> T {
    let threshold: T = T::from_subset(&MIN_BARRIER_DETERMINANT);
    threshold.max(T::default_epsilon())
}

/// Returns `true` if a barrier metric may be evaluated at a tensor with determinant `tau`.
///
/// NaN determinants are rejected.
pub fn is_valid_barrier_determinant<T: Real>(tau: T) -> bool {
    tau >= barrier_threshold()
}

/// Computes $\tau = \det T$ for a barrier metric, or reports a barrier violation for `metric`.
pub fn barrier_determinant<T, D>(metric: &'static str, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let tau = D::determinant(t);
    if is_valid_barrier_determinant(tau) {
        Ok(tau)
    } else {
        trace!("Barrier violated for {metric}: det(T) = {tau}");
        Err(MetricError::BarrierViolated {
            metric,
            determinant: tau,
        })
    }
}
