//! Closed-form operations on the small square tensors consumed by target metrics.
//!
//! Only 2x2 and 3x3 tensors are supported, which is encoded in the [`TensorDim`] trait:
//! it is implemented for [`U2`] and [`U3`] and nothing else, so asking for a metric of any
//! other dimension fails to compile.
//!
//! All operations are explicit cofactor formulas. No pivoting or iterative scheme is involved,
//! so results are reproducible bit for bit.
use crate::allocators::TensorAllocator;
use crate::Real;
use nalgebra::{DefaultAllocator, DimName, OMatrix, U2, U3};

/// A tensor dimension supported by target metrics.
pub trait TensorDim: DimName {
    /// The number of stored (upper-triangular) Hessian blocks, $N(N+1)/2$.
    const NUM_HESSIAN_BLOCKS: usize;

    /// Computes $\tau = \det T$ by cofactor expansion.
    fn determinant<T>(t: &OMatrix<T, Self, Self>) -> T
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, Self>;

    /// Computes the cofactor matrix of $T$, which is the derivative $\pd{\tau}{T}$.
    fn cofactor<T>(t: &OMatrix<T, Self, Self>) -> OMatrix<T, Self, Self>
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, Self>;

    /// Adds $\alpha \pd{^2 \tau}{T^2}$ to the given upper-triangular Hessian blocks.
    ///
    /// The blocks are laid out as described in [`SymmetricHessian`](crate::hessian::SymmetricHessian).
    fn add_scaled_determinant_hessian<T>(
        upper_blocks: &mut [OMatrix<T, Self, Self>],
        alpha: T,
        t: &OMatrix<T, Self, Self>,
    ) where
        T: Real,
        DefaultAllocator: TensorAllocator<T, Self>;
}

/// Returns the position of block $(i, j)$, $i \leq j$, in upper-triangular row-major block storage.
///
/// # Panics
///
/// Panics if $i > j$ or $j \geq N$.
pub fn hessian_block_index<D: DimName>(i: usize, j: usize) -> usize {
    let n = D::dim();
    assert!(i <= j, "Block index must refer to the upper triangle");
    assert!(j < n, "Block index out of bounds");
    i * (2 * n - i + 1) / 2 + (j - i)
}

impl TensorDim for U2 {
    const NUM_HESSIAN_BLOCKS: usize = 3;

    fn determinant<T>(t: &OMatrix<T, U2, U2>) -> T
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U2>,
    {
        t[(0, 0)] * t[(1, 1)] - t[(0, 1)] * t[(1, 0)]
    }

    fn cofactor<T>(t: &OMatrix<T, U2, U2>) -> OMatrix<T, U2, U2>
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U2>,
    {
        #[rustfmt::skip]
        let cofactor = OMatrix::<T, U2, U2>::from_row_slice(&[
             t[(1, 1)], -t[(1, 0)],
            -t[(0, 1)],  t[(0, 0)],
        ]);
        cofactor
    }

    fn add_scaled_determinant_hessian<T>(upper_blocks: &mut [OMatrix<T, U2, U2>], alpha: T, _t: &OMatrix<T, U2, U2>)
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U2>,
    {
        // The determinant is bilinear in the two columns, so only the off-diagonal block is non-zero
        // and it does not depend on T
        let block = &mut upper_blocks[hessian_block_index::<U2>(0, 1)];
        block[(0, 1)] += alpha;
        block[(1, 0)] -= alpha;
    }
}

/// Cross product of two columns given as arrays.
fn cross<T: Real>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn column3<T>(t: &OMatrix<T, U3, U3>, j: usize) -> [T; 3]
where
    T: Real,
    DefaultAllocator: TensorAllocator<T, U3>,
{
    [t[(0, j)], t[(1, j)], t[(2, j)]]
}

/// Adds $\alpha [v]_\times$ to `block`, where $[v]_\times w = v \times w$.
fn add_scaled_cross_product_matrix<T>(block: &mut OMatrix<T, U3, U3>, alpha: T, v: &[T; 3])
where
    T: Real,
    DefaultAllocator: TensorAllocator<T, U3>,
{
    let [x, y, z] = *v;
    block[(0, 1)] -= alpha * z;
    block[(0, 2)] += alpha * y;
    block[(1, 0)] += alpha * z;
    block[(1, 2)] -= alpha * x;
    block[(2, 0)] -= alpha * y;
    block[(2, 1)] += alpha * x;
}

impl TensorDim for U3 {
    const NUM_HESSIAN_BLOCKS: usize = 6;

    fn determinant<T>(t: &OMatrix<T, U3, U3>) -> T
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U3>,
    {
        // Expansion along the first column: t0 . (t1 x t2)
        let t0 = column3(t, 0);
        let c0 = cross(&column3(t, 1), &column3(t, 2));
        t0[0] * c0[0] + t0[1] * c0[1] + t0[2] * c0[2]
    }

    fn cofactor<T>(t: &OMatrix<T, U3, U3>) -> OMatrix<T, U3, U3>
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U3>,
    {
        let t0 = column3(t, 0);
        let t1 = column3(t, 1);
        let t2 = column3(t, 2);
        let columns = [cross(&t1, &t2), cross(&t2, &t0), cross(&t0, &t1)];
        OMatrix::<T, U3, U3>::from_fn(|r, c| columns[c][r])
    }

    fn add_scaled_determinant_hessian<T>(upper_blocks: &mut [OMatrix<T, U3, U3>], alpha: T, t: &OMatrix<T, U3, U3>)
    where
        T: Real,
        DefaultAllocator: TensorAllocator<T, U3>,
    {
        // With tau = eps_abc t0_a t1_b t2_c, the block coupling columns i and j is the cross product
        // matrix of the remaining column, with sign given by the orientation of (i, j, k)
        let t0 = column3(t, 0);
        let t1 = column3(t, 1);
        let t2 = column3(t, 2);
        add_scaled_cross_product_matrix(&mut upper_blocks[hessian_block_index::<U3>(0, 1)], -alpha, &t2);
        add_scaled_cross_product_matrix(&mut upper_blocks[hessian_block_index::<U3>(0, 2)], alpha, &t1);
        add_scaled_cross_product_matrix(&mut upper_blocks[hessian_block_index::<U3>(1, 2)], -alpha, &t0);
    }
}

/// Computes $\tau = \det T$.
pub fn determinant<T, D>(t: &OMatrix<T, D, D>) -> T
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    D::determinant(t)
}

/// Computes the cofactor matrix $\operatorname{cof} T = \operatorname{adj}(T)^T = \pd{\tau}{T}$.
pub fn cofactor<T, D>(t: &OMatrix<T, D, D>) -> OMatrix<T, D, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    D::cofactor(t)
}

/// Computes the adjugate $\operatorname{adj} T$, which satisfies $T \operatorname{adj} T = \tau I$.
pub fn adjugate<T, D>(t: &OMatrix<T, D, D>) -> OMatrix<T, D, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    D::cofactor(t).transpose()
}

/// Computes $T^{-1} = \operatorname{adj}(T) / \tau$, or `None` if $\tau = 0$.
pub fn try_inverse<T, D>(t: &OMatrix<T, D, D>) -> Option<OMatrix<T, D, D>>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let tau = D::determinant(t);
    if tau == T::zero() {
        None
    } else {
        Some(adjugate(t) / tau)
    }
}

/// Computes $\operatorname{tr} T$.
pub fn trace<T, D>(t: &OMatrix<T, D, D>) -> T
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    (0..D::dim()).fold(T::zero(), |acc, i| acc + t[(i, i)])
}

/// Computes the squared Frobenius norm $|T|^2 = T : T$.
pub fn frobenius_norm_squared<T, D>(t: &OMatrix<T, D, D>) -> T
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    t.iter().fold(T::zero(), |acc, &t_ij| acc + t_ij * t_ij)
}

/// Computes the Frobenius norm $|T|$.
pub fn frobenius_norm<T, D>(t: &OMatrix<T, D, D>) -> T
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    frobenius_norm_squared(t).sqrt()
}

/// The identity tensor.
pub fn identity<T, D>() -> OMatrix<T, D, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    OMatrix::<T, D, D>::identity()
}
