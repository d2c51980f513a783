use crate::allocators::TensorAllocator;
use crate::barrier::barrier_determinant;
use crate::error::MetricError;
use crate::hessian::SymmetricHessian;
use crate::metric::{MetricKind, TargetMetric};
use crate::tensor::{cofactor, frobenius_norm_squared, trace, TensorDim};
use crate::Real;
use nalgebra::{DefaultAllocator, OMatrix};
use numeric_literals::replace_float_literals;

/// Sign of the trace, with $\operatorname{sgn}(0) = 0$.
///
/// The orientation term is $C^1$ but not $C^2$ at $\operatorname{tr} T = 0$, and zero is the
/// average of the one-sided second derivatives there.
fn trace_sign<T: Real>(tr: T) -> T {
    if tr > T::zero() {
        T::one()
    } else if tr < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// The quantity $u(T) = |T|^2 - \operatorname{tr}(T) |\operatorname{tr}(T)| / N$ and the trace.
fn orientation_value<T, D>(t: &OMatrix<T, D, D>) -> (T, T)
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let n_dim = T::from_usize(D::dim()).expect("dimension must fit in T");
    let tr = trace(t);
    (frobenius_norm_squared(t) - tr * tr.abs() / n_dim, tr)
}

/// $u(T)$ and the trace together with the gradient of $u$.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn orientation_numerator<T, D>(t: &OMatrix<T, D, D>) -> (T, T, OMatrix<T, D, D>)
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    let n_dim = T::from_usize(D::dim()).expect("dimension must fit in T");
    let (u, tr) = orientation_value(t);
    let du = t * 2.0 - OMatrix::<T, D, D>::identity() * (2.0 * tr.abs() / n_dim);
    (u, tr, du)
}

/// The shape and orientation barrier metric.
///
/// $$
/// \mu(T) = \frac{|T|^2 - \operatorname{tr}(T) |\operatorname{tr}(T)| / N}{2 \tau}.
/// $$
/// It is zero exactly when $T$ is a positive multiple of the identity, i.e. when the element
/// has the target's shape and orientation but possibly a different size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeOrientB2;

impl ShapeOrientB2 {
    pub const NAME: &'static str = "ShapeOrientB2";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for ShapeOrientB2
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Barrier
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let (u, _) = orientation_value(t);
        Ok(u / (2.0 * tau))
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let (u, _, du) = orientation_numerator(t);
        let value = u / (2.0 * tau);
        let grad = du / (2.0 * tau) - cofactor(t) * (u / (2.0 * tau * tau));
        Ok((value, grad))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let tau = barrier_determinant(Self::NAME, t)?;
        let (u, tr, du) = orientation_numerator(t);
        let value = u / (2.0 * tau);
        let cof = cofactor(t);
        let grad = &du / (2.0 * tau) - &cof * (u / (2.0 * tau * tau));

        let n_dim = T::from_usize(D::dim()).expect("dimension must fit in T");
        let tau2 = tau * tau;
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(1.0 / tau);
        hess.add_scaled_outer_product(-trace_sign(tr) / (n_dim * tau), &OMatrix::<T, D, D>::identity());
        hess.add_scaled_sum_outer_product(-1.0 / (2.0 * tau2), &du, &cof);
        hess.add_scaled_outer_product(u / (tau2 * tau), &cof);
        hess.add_scaled_determinant_hessian(-u / (2.0 * tau2), t);
        Ok((value, grad, hess))
    }
}

/// The non-barrier shape and orientation metric.
///
/// $$
/// \mu(T) = |T|^2 - \operatorname{tr}(T) |\operatorname{tr}(T)| / N.
/// $$
/// Zero exactly when $T$ is a non-negative multiple of the identity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeOrientNB1;

impl ShapeOrientNB1 {
    pub const NAME: &'static str = "ShapeOrientNB1";
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
impl<T, D> TargetMetric<T, D> for ShapeOrientNB1
where
    T: Real,
    D: TensorDim,
    DefaultAllocator: TensorAllocator<T, D>,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> MetricKind {
        MetricKind::NonBarrier
    }

    fn evaluate(&self, t: &OMatrix<T, D, D>) -> Result<T, MetricError<T>> {
        let (u, _) = orientation_value(t);
        Ok(u)
    }

    fn evaluate_with_grad(&self, t: &OMatrix<T, D, D>) -> Result<(T, OMatrix<T, D, D>), MetricError<T>> {
        let (u, _, du) = orientation_numerator(t);
        Ok((u, du))
    }

    fn evaluate_with_hess(
        &self,
        t: &OMatrix<T, D, D>,
    ) -> Result<(T, OMatrix<T, D, D>, SymmetricHessian<T, D>), MetricError<T>> {
        let (u, tr, du) = orientation_numerator(t);

        let n_dim = T::from_usize(D::dim()).expect("dimension must fit in T");
        let mut hess = SymmetricHessian::zeros();
        hess.add_scaled_identity(2.0);
        hess.add_scaled_outer_product(-2.0 * trace_sign(tr) / n_dim, &OMatrix::<T, D, D>::identity());
        Ok((u, du, hess))
    }
}
