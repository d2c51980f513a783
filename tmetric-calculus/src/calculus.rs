use nalgebra::{DMatrix, DVector, DVectorView, DefaultAllocator, DimName, OMatrix};
use numeric_literals::replace_float_literals;
use tmetric_traits::allocators::TensorAllocator;
use tmetric_traits::Real;

/// Builds an $N \times N$ tensor from its column-major vectorization $\operatorname{vec}(T)$.
///
/// # Panics
///
/// Panics if `x` does not have exactly $N^2$ entries.
pub fn tensor_from_vec<T, D>(x: DVectorView<T>) -> OMatrix<T, D, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: TensorAllocator<T, D>,
{
    assert_eq!(x.len(), D::dim() * D::dim(), "Vector length must be N^2");
    OMatrix::<T, D, D>::from_iterator(x.iter().copied())
}

/// The column-major vectorization $\operatorname{vec}(T)$ of a tensor.
pub fn vec_from_tensor<T, D>(t: &OMatrix<T, D, D>) -> DVector<T>
where
    T: Real,
    D: DimName,
    DefaultAllocator: TensorAllocator<T, D>,
{
    DVector::from_iterator(t.len(), t.iter().copied())
}

/// Approximates the gradient $\pd{f}{T}$ of a scalar function of a tensor with central finite
/// differences of step `h`.
///
/// Entry $(i, j)$ of the result approximates $\pd{f}{T_{ij}}$, so the result is directly
/// comparable with an analytic tensor gradient.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn approximate_tensor_gradient_fd<T, D>(
    mut f: impl FnMut(&OMatrix<T, D, D>) -> T,
    t: &OMatrix<T, D, D>,
    h: T,
) -> OMatrix<T, D, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let mut t_perturbed = t.clone();
    let mut grad = OMatrix::<T, D, D>::zeros();
    for k in 0..t.len() {
        let t_k = t[k];
        t_perturbed[k] = t_k + h;
        let f_plus = f(&t_perturbed);
        t_perturbed[k] = t_k - h;
        let f_minus = f(&t_perturbed);
        t_perturbed[k] = t_k;
        grad[k] = (f_plus - f_minus) / (2.0 * h);
    }
    grad
}

/// Approximates the Hessian of a scalar function of a tensor by central finite differences of
/// its analytic gradient `grad`.
///
/// The result is the dense $N^2 \times N^2$ matrix with respect to $\operatorname{vec}(T)$:
/// column $k$ holds the derivative of $\operatorname{vec}(\pd{f}{T})$ with respect to entry $k$
/// of $\operatorname{vec}(T)$. No symmetrization is applied, so asymmetry in the result points
/// at an inconsistent gradient.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn approximate_tensor_hessian_fd<T, D>(
    mut grad: impl FnMut(&OMatrix<T, D, D>) -> OMatrix<T, D, D>,
    t: &OMatrix<T, D, D>,
    h: T,
) -> DMatrix<T>
where
    T: Real,
    D: DimName,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let m = t.len();
    let mut hessian = DMatrix::zeros(m, m);
    let mut t_perturbed = t.clone();
    for k in 0..m {
        let t_k = t[k];
        t_perturbed[k] = t_k + h;
        let grad_plus = grad(&t_perturbed);
        t_perturbed[k] = t_k - h;
        let grad_minus = grad(&t_perturbed);
        t_perturbed[k] = t_k;

        let dgrad_dtk = (grad_plus - grad_minus) / (2.0 * h);
        hessian.column_mut(k).copy_from(&vec_from_tensor(&dgrad_dtk));
    }
    hessian
}
