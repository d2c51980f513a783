//! Target-matrix quality metrics for mesh optimization.
//!
//! A target metric $\mu(T)$ measures how far the Jacobian $T$ of an element, taken relative to
//! the element's ideal (target) shape, is from being ideal. The metric is small for good
//! elements and grows as they distort. Mesh optimizers minimize a weighted sum of $\mu$ over all
//! sample points of all elements and need its gradient $\pd{\mu}{T}$ and Hessian
//! $\pd{^2 \mu}{T^2}$, which every metric here provides in closed form.
//!
//! The crate is organized as follows:
//!
//! - [`tensor`]: determinant, cofactor and friends for 2x2 and 3x3 tensors.
//! - [`hessian`]: block storage of the symmetric Hessian, [`SymmetricHessian`].
//! - [`metric`]: the [`TargetMetric`] trait.
//! - [`metrics`]: the concrete metrics and the composites [`Sum`](metrics::Sum),
//!   [`Scale`](metrics::Scale) and [`Squared`](metrics::Squared).
//! - [`barrier`]: the determinant check shared by barrier metrics.
//! - [`config`]: serde descriptions of metrics that can be built at runtime.
//! - [`batch`]: sequential and parallel evaluation over many tensors.
pub mod allocators;
pub mod barrier;
pub mod batch;
pub mod config;
pub mod error;
pub mod hessian;
pub mod metric;
pub mod metrics;
pub mod tensor;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;

pub use config::{BoxedMetric, MetricConfig};
pub use error::MetricError;
pub use hessian::SymmetricHessian;
pub use metric::{MetricKind, TargetMetric};
pub use tensor::TensorDim;
pub use tmetric_traits::Real;
