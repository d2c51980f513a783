//! The library of target metrics.
//!
//! Metric names follow the usual convention: the leading words list the properties of $T$ the
//! metric controls (shape, size, orientation), `B` marks a barrier metric and `NB` a non-barrier
//! metric, and the trailing digit distinguishes variants.
//!
//! | Metric | Controls | Kind | Dimensions |
//! |---|---|---|---|
//! | [`ShapeB1`] | shape | barrier | 2, 3 |
//! | [`ShapeNB1`] | shape | non-barrier | 2, 3 |
//! | [`InverseMeanRatio`] | shape | barrier | 2, 3 |
//! | [`ShapeOrientB2`] | shape, orientation | barrier | 2, 3 |
//! | [`ShapeOrientNB1`] | shape, orientation | non-barrier | 2, 3 |
//! | [`ShapeSizeNB1`] | shape, size | non-barrier | 2, 3 |
//! | [`ShapeSize2DB1`] | shape, size | barrier | 2 |
//! | [`SizeB1`] | size | barrier | 2, 3 |
//! | [`SizeNB1`] | size | non-barrier | 2, 3 |
//! | [`ShapeSizeOrientB1`] | shape, size, orientation | barrier | 2, 3 |
//! | [`ShapeSizeOrientNB1`] | shape, size, orientation | non-barrier | 2, 3 |
//! | [`UntangleBeta`] | inversion | non-barrier | 2, 3 |
//!
//! Metrics only defined for one dimension implement [`TargetMetric`](crate::TargetMetric) for
//! that dimension only.
use crate::error::MetricError;
use crate::Real;

mod composite;
mod shape;
mod shape_orient;
mod shape_size;
mod shape_size_orient;
mod size;
mod untangle;

pub use composite::*;
pub use shape::*;
pub use shape_orient::*;
pub use shape_size::*;
pub use shape_size_orient::*;
pub use size::*;
pub use untangle::*;

/// Returns `Ok(())` if `valid`, otherwise an [`MetricError::InvalidParameter`] error.
pub(crate) fn check_parameter<T: Real>(
    metric: &'static str,
    parameter: &'static str,
    value: T,
    valid: bool,
    reason: &'static str,
) -> Result<(), MetricError<T>> {
    if valid {
        Ok(())
    } else {
        Err(MetricError::InvalidParameter {
            metric,
            parameter,
            value,
            reason,
        })
    }
}

/// Returns `value` if it is finite, otherwise a [`MetricError::NonFiniteResult`] error.
pub(crate) fn check_finite<T: Real>(metric: &'static str, value: T) -> Result<T, MetricError<T>> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::NonFiniteResult { metric, value })
    }
}

/// Checks that all `entries` of a gradient or Hessian are finite.
pub(crate) fn check_finite_entries<'a, T: Real>(
    metric: &'static str,
    entries: impl IntoIterator<Item = &'a T>,
) -> Result<(), MetricError<T>> {
    match entries.into_iter().find(|x| !x.is_finite()) {
        Some(&value) => Err(MetricError::NonFiniteResult { metric, value }),
        None => Ok(()),
    }
}
