//! Block storage for the Hessian of a scalar function of a square tensor.
use crate::allocators::TensorAllocator;
use crate::tensor::{hessian_block_index, TensorDim};
use crate::Real;
use itertools::izip;
use nalgebra::{DMatrix, DefaultAllocator, OMatrix};
use std::array;

/// The largest number of blocks any supported dimension needs ($N = 3$).
const MAX_HESSIAN_BLOCKS: usize = 6;

/// The Hessian $\pd{^2 f}{T^2}$ of a scalar function $f$ of an $N \times N$ tensor $T$.
///
/// The Hessian is a symmetric fourth-order tensor. It is stored as the $N(N+1)/2$
/// upper-triangular blocks of size $N \times N$, row by row:
/// `(0,0), (0,1), (1,1)` for $N = 2$ and `(0,0), (0,1), (0,2), (1,1), (1,2), (2,2)` for $N = 3$.
/// Block $(i, j)$ couples column $i$ and column $j$ of $T$:
/// $$
/// H^{(ij)}_{rs} = \pd{^2 f}{T_{ri} \partial T_{sj}}.
/// $$
/// The remaining blocks follow from symmetry, $H^{(ji)} = (H^{(ij)})^T$, and the diagonal blocks
/// are themselves symmetric.
///
/// [`to_dense`](Self::to_dense) reconstructs the full $N^2 \times N^2$ matrix with respect to the
/// column-major vectorization of $T$, i.e. the entry $T_{rc}$ has index $cN + r$.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricHessian<T, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    blocks: [OMatrix<T, D, D>; MAX_HESSIAN_BLOCKS],
}

impl<T, D> Default for SymmetricHessian<T, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T, D> SymmetricHessian<T, D>
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    pub fn zeros() -> Self {
        Self {
            blocks: array::from_fn(|_| OMatrix::<T, D, D>::zeros()),
        }
    }

    /// The number of stored blocks, $N(N+1)/2$.
    pub fn num_blocks(&self) -> usize {
        D::NUM_HESSIAN_BLOCKS
    }

    /// The stored upper-triangular blocks in row-major order.
    pub fn upper_blocks(&self) -> &[OMatrix<T, D, D>] {
        &self.blocks[..D::NUM_HESSIAN_BLOCKS]
    }

    pub fn upper_blocks_mut(&mut self) -> &mut [OMatrix<T, D, D>] {
        &mut self.blocks[..D::NUM_HESSIAN_BLOCKS]
    }

    /// Returns block $(i, j)$, transposing the stored block $(j, i)$ if $i > j$.
    ///
    /// # Panics
    ///
    /// Panics if $i$ or $j$ is not smaller than $N$.
    pub fn block(&self, i: usize, j: usize) -> OMatrix<T, D, D> {
        if i <= j {
            self.blocks[hessian_block_index::<D>(i, j)].clone()
        } else {
            self.blocks[hessian_block_index::<D>(j, i)].transpose()
        }
    }

    /// Sets all entries to zero.
    pub fn fill_zero(&mut self) {
        for block in self.upper_blocks_mut() {
            block.fill(T::zero());
        }
    }

    /// Adds $\alpha \mathbb{I}$, where $\mathbb{I}$ is the identity on $N \times N$ tensors.
    ///
    /// This is the Hessian of $\frac{\alpha}{2} |T|^2$.
    pub fn add_scaled_identity(&mut self, alpha: T) {
        for i in 0..D::dim() {
            let block = &mut self.blocks[hessian_block_index::<D>(i, i)];
            for r in 0..D::dim() {
                block[(r, r)] += alpha;
            }
        }
    }

    /// Adds $\alpha \\, A \otimes A$, the scaled outer product of the vectorized tensor $A$ with itself.
    pub fn add_scaled_outer_product(&mut self, alpha: T, a: &OMatrix<T, D, D>) {
        let n = D::dim();
        for i in 0..n {
            for j in i..n {
                let block = &mut self.blocks[hessian_block_index::<D>(i, j)];
                block.ger(alpha, &a.column(i), &a.column(j), T::one());
            }
        }
    }

    /// Adds $\alpha (A \otimes B + B \otimes A)$.
    pub fn add_scaled_sum_outer_product(&mut self, alpha: T, a: &OMatrix<T, D, D>, b: &OMatrix<T, D, D>) {
        let n = D::dim();
        for i in 0..n {
            for j in i..n {
                let block = &mut self.blocks[hessian_block_index::<D>(i, j)];
                block.ger(alpha, &a.column(i), &b.column(j), T::one());
                block.ger(alpha, &b.column(i), &a.column(j), T::one());
            }
        }
    }

    /// Adds $\alpha \pd{^2 \tau}{T^2}$, the scaled Hessian of $\tau = \det T$ evaluated at `t`.
    pub fn add_scaled_determinant_hessian(&mut self, alpha: T, t: &OMatrix<T, D, D>) {
        D::add_scaled_determinant_hessian(self.upper_blocks_mut(), alpha, t);
    }

    /// Multiplies every entry by $\alpha$.
    pub fn scale_mut(&mut self, alpha: T) {
        for block in self.upper_blocks_mut() {
            *block *= alpha;
        }
    }

    /// Adds $\alpha G$ for another Hessian $G$.
    pub fn add_scaled(&mut self, alpha: T, other: &Self) {
        for (block, other_block) in izip!(self.upper_blocks_mut(), other.upper_blocks()) {
            *block += other_block * alpha;
        }
    }

    /// Reconstructs the dense $N^2 \times N^2$ Hessian with respect to the column-major
    /// vectorization of $T$.
    pub fn to_dense(&self) -> DMatrix<T> {
        let n = D::dim();
        let mut dense = DMatrix::zeros(n * n, n * n);
        for i in 0..n {
            for j in 0..n {
                dense
                    .view_mut((i * n, j * n), (n, n))
                    .copy_from(&self.block(i, j));
            }
        }
        dense
    }
}
