//! Serializable metric descriptions.
//!
//! A [`MetricConfig`] names a metric and its parameters, so that metric choices can live in
//! configuration files. The metric is selected by the `metric` field:
//!
//! ```json
//! { "metric": "sum",
//!   "first": { "metric": "shape_b1" },
//!   "second": { "metric": "scale", "alpha": 0.1, "metric_config": { "metric": "size_b1" } } }
//! ```
//!
//! Parameters are stored as `f64` and validated only when the metric is built.
use crate::allocators::TensorAllocator;
use crate::error::MetricError;
use crate::metric::TargetMetric;
use crate::metrics::{
    InverseMeanRatio, Scale, ShapeB1, ShapeNB1, ShapeOrientB2, ShapeOrientNB1, ShapeSize2DB1, ShapeSizeNB1,
    ShapeSizeOrientB1, ShapeSizeOrientNB1, SizeB1, SizeNB1, Squared, Sum, UntangleBeta,
};
use crate::tensor::TensorDim;
use crate::Real;
use log::debug;
use nalgebra::{DefaultAllocator, U2, U3};
use serde::{Deserialize, Serialize};

/// A type-erased metric, as produced by [`MetricConfig`].
pub type BoxedMetric<T, D> = Box<dyn TargetMetric<T, D>>;

fn default_gamma() -> f64 {
    ShapeSizeNB1::<f64>::DEFAULT_GAMMA
}

fn default_epsilon() -> f64 {
    0.0
}

/// Description of a metric, possibly composed of other metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric")]
pub enum MetricConfig {
    #[serde(rename = "shape_b1")]
    ShapeB1,
    #[serde(rename = "shape_nb1")]
    ShapeNB1,
    #[serde(rename = "inverse_mean_ratio")]
    InverseMeanRatio,
    #[serde(rename = "shape_orient_b2")]
    ShapeOrientB2,
    #[serde(rename = "shape_orient_nb1")]
    ShapeOrientNB1,
    #[serde(rename = "shape_size_nb1")]
    ShapeSizeNB1 {
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
    #[serde(rename = "shape_size_2d_b1")]
    ShapeSize2DB1,
    #[serde(rename = "size_b1")]
    SizeB1,
    #[serde(rename = "size_nb1")]
    SizeNB1,
    #[serde(rename = "shape_size_orient_b1")]
    ShapeSizeOrientB1,
    #[serde(rename = "shape_size_orient_nb1")]
    ShapeSizeOrientNB1,
    #[serde(rename = "untangle_beta")]
    UntangleBeta {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    #[serde(rename = "sum")]
    Sum {
        first: Box<MetricConfig>,
        second: Box<MetricConfig>,
    },
    #[serde(rename = "scale")]
    Scale {
        alpha: f64,
        metric_config: Box<MetricConfig>,
    },
    #[serde(rename = "squared")]
    Squared { metric_config: Box<MetricConfig> },
}

impl MetricConfig {
    /// Builds the described metric for 2x2 tensors.
    pub fn build_2d<T: Real>(&self) -> Result<BoxedMetric<T, U2>, MetricError<T>> {
        debug!("Building 2D metric from {:?}", self);
        self.build(|| {
            let metric: BoxedMetric<T, U2> = Box::new(ShapeSize2DB1);
            Ok(metric)
        })
    }

    /// Builds the described metric for 3x3 tensors.
    ///
    /// Fails with [`MetricError::UnsupportedDimension`] if the description contains a metric
    /// that only exists in 2D.
    pub fn build_3d<T: Real>(&self) -> Result<BoxedMetric<T, U3>, MetricError<T>> {
        debug!("Building 3D metric from {:?}", self);
        self.build(|| {
            Err(MetricError::UnsupportedDimension {
                metric: ShapeSize2DB1::NAME,
                dim: 3,
            })
        })
    }

    fn build<T, D>(
        &self,
        shape_size_2d_b1: fn() -> Result<BoxedMetric<T, D>, MetricError<T>>,
    ) -> Result<BoxedMetric<T, D>, MetricError<T>>
    where
        T: Real,
        D: TensorDim,
        DefaultAllocator: TensorAllocator<T, D>,
        ShapeB1: TargetMetric<T, D>,
        ShapeNB1: TargetMetric<T, D>,
        InverseMeanRatio: TargetMetric<T, D>,
        ShapeSizeNB1<T>: TargetMetric<T, D>,
    {
        let metric: BoxedMetric<T, D> = match self {
            Self::ShapeB1 => Box::new(ShapeB1),
            Self::ShapeNB1 => Box::new(ShapeNB1),
            Self::InverseMeanRatio => Box::new(InverseMeanRatio),
            Self::ShapeOrientB2 => Box::new(ShapeOrientB2),
            Self::ShapeOrientNB1 => Box::new(ShapeOrientNB1),
            Self::ShapeSizeNB1 { gamma } => Box::new(ShapeSizeNB1::new(T::from_subset(gamma))?),
            Self::ShapeSize2DB1 => shape_size_2d_b1()?,
            Self::SizeB1 => Box::new(SizeB1),
            Self::SizeNB1 => Box::new(SizeNB1),
            Self::ShapeSizeOrientB1 => Box::new(ShapeSizeOrientB1),
            Self::ShapeSizeOrientNB1 => Box::new(ShapeSizeOrientNB1),
            Self::UntangleBeta { epsilon } => Box::new(UntangleBeta::new(T::from_subset(epsilon))?),
            Self::Sum { first, second } => {
                let first = first.build(shape_size_2d_b1)?;
                let second = second.build(shape_size_2d_b1)?;
                Box::new(Sum::new(first, second))
            }
            Self::Scale { alpha, metric_config } => {
                let metric = metric_config.build(shape_size_2d_b1)?;
                Box::new(Scale::new(T::from_subset(alpha), metric)?)
            }
            Self::Squared { metric_config } => Box::new(Squared::new(metric_config.build(shape_size_2d_b1)?)),
        };
        Ok(metric)
    }
}
