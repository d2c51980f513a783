//! Helper traits for allocator trait bounds.
pub use tmetric_traits::allocators::*;
