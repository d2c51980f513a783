//! Errors reported by metric construction and evaluation.
use std::fmt;
use std::fmt::{Display, Formatter};

/// Library-wide error type.
///
/// `T` is the scalar type of the metric, so that offending values are reported exactly.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MetricError<T> {
    /// A barrier metric was evaluated at a tensor whose determinant is not safely positive.
    ///
    /// This is an expected condition during optimization: the caller may shrink its step,
    /// reject the trial configuration or switch to a non-barrier metric.
    BarrierViolated { metric: &'static str, determinant: T },
    /// A construction parameter is outside of its valid range.
    InvalidParameter {
        metric: &'static str,
        parameter: &'static str,
        value: T,
        reason: &'static str,
    },
    /// The metric is not defined for tensors of the requested dimension.
    UnsupportedDimension { metric: &'static str, dim: usize },
    /// A composite metric produced a value or derivative that does not fit in `T`.
    ///
    /// `value` is the first offending quantity, typically an infinity from overflow.
    NonFiniteResult { metric: &'static str, value: T },
}

impl<T: Display> Display for MetricError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BarrierViolated { metric, determinant } => {
                write!(
                    f,
                    "Barrier violated for metric {}: determinant {} is not safely positive",
                    metric, determinant
                )
            }
            Self::InvalidParameter {
                metric,
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid parameter {} = {} for metric {}: {}",
                    parameter, value, metric, reason
                )
            }
            Self::UnsupportedDimension { metric, dim } => {
                write!(f, "Metric {} is not available for {}x{} tensors", metric, dim, dim)
            }
            Self::NonFiniteResult { metric, value } => {
                write!(f, "Metric {} produced the non-finite result {}", metric, value)
            }
        }
    }
}

impl<T: fmt::Debug + Display> std::error::Error for MetricError<T> {}

impl<T> MetricError<T> {
    /// Returns `true` if this error signals a barrier violation.
    pub fn is_barrier_violation(&self) -> bool {
        matches!(self, Self::BarrierViolated { .. })
    }
}
