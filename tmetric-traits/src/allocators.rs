//! Helper traits for allocator trait bounds.
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar};

/// An allocator for square tensors of dimension `D` and their columns.
///
/// Generic metric code only ever needs `D x D` matrices and `D`-vectors (columns of a tensor),
/// so this trait collects exactly those bounds.
pub trait TensorAllocator<T: Scalar, D: DimName>: Allocator<T, D> + Allocator<T, D, D> {}

impl<T, D> TensorAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D> + Allocator<T, D, D>,
{
}
