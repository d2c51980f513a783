//! Core traits shared by the `tmetric` crates.
use nalgebra::RealField;

pub use nalgebra;

/// Scalar type used for tensors, metric values and derivatives.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

pub mod allocators;
