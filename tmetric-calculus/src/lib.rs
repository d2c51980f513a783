//! Numerical differentiation of functions of a tensor.
//!
//! Every analytic gradient and Hessian in `tmetric` is verified against the central finite
//! difference approximations in [`calculus`]. Hessians are compared in their dense form with
//! respect to the column-major vectorization $\operatorname{vec}(T)$.

/// Central finite difference approximations of tensor gradients and Hessians
pub mod calculus;
