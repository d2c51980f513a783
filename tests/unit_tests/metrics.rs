use crate::assert_derivatives_match_finite_differences;
use matrixcompare::assert_scalar_eq;
use nalgebra::{matrix, Matrix2, Matrix3, U2, U3};
use paste::paste;
use proptest::prelude::*;
use tmetric::metrics::*;
use tmetric::proptest::{
    arbitrary_tensor, inverted_tensor2, inverted_tensor3, near_singular_tensor2, near_singular_tensor3, rotation2,
    rotation3, tensor2_with_singular_values, tensor3_with_singular_values,
};
use tmetric::{MetricError, MetricKind, TargetMetric};

/// Singular values used for barrier metrics: the determinant stays far from the barrier and
/// derivatives stay moderate, so finite differences are accurate.
const SINGULAR_VALUES: std::ops::Range<f64> = 0.7..1.5;

fn barrier_tensor2() -> impl Strategy<Value = Matrix2<f64>> {
    tensor2_with_singular_values(SINGULAR_VALUES)
}

fn barrier_tensor3() -> impl Strategy<Value = Matrix3<f64>> {
    tensor3_with_singular_values(SINGULAR_VALUES)
}

// The orientation metrics are not twice differentiable at tr(T) = 0
fn barrier_tensor2_away_from_zero_trace() -> impl Strategy<Value = Matrix2<f64>> {
    barrier_tensor2().prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3)
}

fn barrier_tensor3_away_from_zero_trace() -> impl Strategy<Value = Matrix3<f64>> {
    barrier_tensor3().prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3)
}

fn near_singular2() -> impl Strategy<Value = Matrix2<f64>> {
    near_singular_tensor2(SINGULAR_VALUES, 1e-4..1e-2)
}

fn near_singular3() -> impl Strategy<Value = Matrix3<f64>> {
    near_singular_tensor3(SINGULAR_VALUES, 1e-4..1e-2)
}

fn any_tensor2_away_from_zero_trace() -> impl Strategy<Value = Matrix2<f64>> {
    arbitrary_tensor::<U2>(-2.0..2.0).prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3)
}

fn any_tensor3_away_from_zero_trace() -> impl Strategy<Value = Matrix3<f64>> {
    arbitrary_tensor::<U3>(-2.0..2.0).prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3)
}

macro_rules! test_metric_derivatives {
    ($test_prefix:ident, $metric:expr, $dim:ident, $strategy:expr) => {
        paste! {
            proptest! {
                #[test]
                fn [<$test_prefix _ $dim:lower _derivatives_match_finite_differences>](t in $strategy) {
                    assert_derivatives_match_finite_differences::<$dim>(&$metric, &t);
                }
            }
        }
    };
}

test_metric_derivatives!(shape_b1, ShapeB1, U2, barrier_tensor2());
test_metric_derivatives!(shape_b1, ShapeB1, U3, barrier_tensor3());
test_metric_derivatives!(shape_nb1, ShapeNB1, U2, arbitrary_tensor::<U2>(-2.0..2.0));
test_metric_derivatives!(shape_nb1, ShapeNB1, U3, arbitrary_tensor::<U3>(-2.0..2.0));
test_metric_derivatives!(inverse_mean_ratio, InverseMeanRatio, U2, barrier_tensor2());
test_metric_derivatives!(inverse_mean_ratio, InverseMeanRatio, U3, barrier_tensor3());
test_metric_derivatives!(shape_orient_b2, ShapeOrientB2, U2, barrier_tensor2_away_from_zero_trace());
test_metric_derivatives!(shape_orient_b2, ShapeOrientB2, U3, barrier_tensor3_away_from_zero_trace());
test_metric_derivatives!(shape_orient_nb1, ShapeOrientNB1, U2, any_tensor2_away_from_zero_trace());
test_metric_derivatives!(shape_orient_nb1, ShapeOrientNB1, U3, any_tensor3_away_from_zero_trace());
test_metric_derivatives!(shape_size_nb1, ShapeSizeNB1::<f64>::default(), U2, arbitrary_tensor::<U2>(-2.0..2.0));
test_metric_derivatives!(shape_size_nb1, ShapeSizeNB1::<f64>::new(0.5).unwrap(), U3, arbitrary_tensor::<U3>(-2.0..2.0));
test_metric_derivatives!(shape_size_2d_b1, ShapeSize2DB1, U2, barrier_tensor2());
test_metric_derivatives!(size_b1, SizeB1, U2, barrier_tensor2());
test_metric_derivatives!(size_b1, SizeB1, U3, barrier_tensor3());
test_metric_derivatives!(size_nb1, SizeNB1, U2, arbitrary_tensor::<U2>(-2.0..2.0));
test_metric_derivatives!(size_nb1, SizeNB1, U3, arbitrary_tensor::<U3>(-2.0..2.0));
test_metric_derivatives!(shape_size_orient_b1, ShapeSizeOrientB1, U2, barrier_tensor2());
test_metric_derivatives!(shape_size_orient_b1, ShapeSizeOrientB1, U3, barrier_tensor3());
test_metric_derivatives!(shape_size_orient_nb1, ShapeSizeOrientNB1, U2, arbitrary_tensor::<U2>(-2.0..2.0));
test_metric_derivatives!(shape_size_orient_nb1, ShapeSizeOrientNB1, U3, arbitrary_tensor::<U3>(-2.0..2.0));
test_metric_derivatives!(untangle_beta, UntangleBeta::<f64>::default(), U2, inverted_tensor2(SINGULAR_VALUES));
test_metric_derivatives!(untangle_beta, UntangleBeta::<f64>::new(0.1).unwrap(), U3, inverted_tensor3(SINGULAR_VALUES));
test_metric_derivatives!(sum, Sum::new(ShapeB1, SizeB1), U2, barrier_tensor2());
test_metric_derivatives!(sum, Sum::new(ShapeNB1, UntangleBeta::<f64>::default()), U3, arbitrary_tensor::<U3>(-2.0..2.0)
    .prop_filter("determinant too close to zero", |t| t.determinant().abs() > 1e-3));
test_metric_derivatives!(scale, Scale::<f64, _>::new(0.25, ShapeSizeOrientB1).unwrap(), U3, barrier_tensor3());
test_metric_derivatives!(squared, Squared::new(ShapeNB1), U2, arbitrary_tensor::<U2>(-2.0..2.0));
test_metric_derivatives!(squared, Squared::new(InverseMeanRatio), U3, barrier_tensor3());

// Non-barrier metrics must stay smooth as the tensor passes through singularity
test_metric_derivatives!(near_singular_shape_nb1, ShapeNB1, U2, near_singular2());
test_metric_derivatives!(near_singular_shape_nb1, ShapeNB1, U3, near_singular3());
test_metric_derivatives!(near_singular_shape_orient_nb1, ShapeOrientNB1, U2, near_singular2()
    .prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3));
test_metric_derivatives!(near_singular_shape_orient_nb1, ShapeOrientNB1, U3, near_singular3()
    .prop_filter("trace too close to zero", |t| t.trace().abs() > 1e-3));
test_metric_derivatives!(near_singular_shape_size_nb1, ShapeSizeNB1::<f64>::default(), U2, near_singular2());
test_metric_derivatives!(near_singular_shape_size_nb1, ShapeSizeNB1::<f64>::default(), U3, near_singular3());
test_metric_derivatives!(near_singular_size_nb1, SizeNB1, U2, near_singular2());
test_metric_derivatives!(near_singular_size_nb1, SizeNB1, U3, near_singular3());
test_metric_derivatives!(near_singular_shape_size_orient_nb1, ShapeSizeOrientNB1, U2, near_singular2());
test_metric_derivatives!(near_singular_shape_size_orient_nb1, ShapeSizeOrientNB1, U3, near_singular3());
test_metric_derivatives!(near_singular_untangle_beta, UntangleBeta::<f64>::default(), U2, near_singular2());
test_metric_derivatives!(near_singular_untangle_beta, UntangleBeta::<f64>::default(), U3, near_singular3());

#[test]
fn norm_based_metrics_are_finite_at_zero_tensor() {
    let zero = Matrix3::<f64>::zeros();

    let (value, grad, hess) = TargetMetric::<f64, U3>::evaluate_with_hess(&ShapeNB1, &zero).unwrap();
    assert_eq!(value, 0.0);
    assert_eq!(grad, Matrix3::zeros());
    assert_eq!(hess.to_dense(), nalgebra::DMatrix::zeros(9, 9));

    // Only the size term (det T - 1)^2 = 1 remains
    let metric = ShapeSizeNB1::<f64>::default();
    let (value, grad, hess) = TargetMetric::<f64, U3>::evaluate_with_hess(&metric, &zero).unwrap();
    assert_eq!(value, 2.0);
    assert_eq!(grad, Matrix3::zeros());
    assert!(hess.to_dense().iter().all(|h| h.is_finite()));
    assert_eq!(hess.to_dense(), nalgebra::DMatrix::zeros(9, 9));
}

#[test]
fn barrier_metrics_reject_inverted_and_degenerate_tensors() {
    let inverted2 = matrix![0.0, 1.0;
                            1.0, 0.0];
    let degenerate2 = matrix![1.0, 2.0;
                              2.0, 4.0];
    let metrics2: Vec<Box<dyn TargetMetric<f64, U2>>> = vec![
        Box::new(ShapeB1),
        Box::new(InverseMeanRatio),
        Box::new(ShapeOrientB2),
        Box::new(ShapeSize2DB1),
        Box::new(SizeB1),
        Box::new(ShapeSizeOrientB1),
    ];
    for metric in &metrics2 {
        assert_eq!(metric.kind(), MetricKind::Barrier);
        for t in [&inverted2, &degenerate2] {
            let expected = MetricError::BarrierViolated {
                metric: metric.name(),
                determinant: t.determinant(),
            };
            assert_eq!(metric.evaluate(t), Err(expected.clone()));
            assert_eq!(metric.evaluate_with_grad(t).unwrap_err(), expected);
            assert_eq!(metric.evaluate_with_hess(t).unwrap_err(), expected);
        }
    }

    let inverted3 = matrix![1.0, 0.0, 0.0;
                            0.0, 1.0, 0.0;
                            0.0, 0.0, -1.0];
    let metrics3: Vec<Box<dyn TargetMetric<f64, U3>>> = vec![
        Box::new(ShapeB1),
        Box::new(InverseMeanRatio),
        Box::new(ShapeOrientB2),
        Box::new(SizeB1),
        Box::new(ShapeSizeOrientB1),
    ];
    for metric in &metrics3 {
        assert!(metric.evaluate(&inverted3).unwrap_err().is_barrier_violation());
    }
}

#[test]
fn barrier_metrics_reject_tiny_positive_determinant() {
    let t = Matrix2::new(1e-7, 0.0, 0.0, 1e-7);
    assert!(TargetMetric::<f64, U2>::evaluate(&ShapeB1, &t)
        .unwrap_err()
        .is_barrier_violation());
}

#[test]
fn single_precision_barrier_rejects_determinants_below_epsilon() {
    let t = Matrix2::<f32>::new(1.0, 0.0, 0.0, 2e-12);
    let expected = MetricError::BarrierViolated {
        metric: ShapeSize2DB1::NAME,
        determinant: 2e-12f32,
    };
    assert_eq!(TargetMetric::<f32, U2>::evaluate(&ShapeSize2DB1, &t), Err(expected.clone()));
    assert_eq!(TargetMetric::<f32, U2>::evaluate_with_grad(&ShapeSize2DB1, &t).unwrap_err(), expected);
    assert_eq!(TargetMetric::<f32, U2>::evaluate_with_hess(&ShapeSize2DB1, &t).unwrap_err(), expected);

    let squared = Squared::new(ShapeSize2DB1);
    assert_eq!(TargetMetric::<f32, U2>::evaluate(&squared, &t), Err(expected));

    // Just above the threshold every output is still finite
    let t = Matrix2::<f32>::new(1.0, 0.0, 0.0, 2.0 * f32::EPSILON);
    let (value, grad, hess) = TargetMetric::<f32, U2>::evaluate_with_hess(&ShapeSize2DB1, &t).unwrap();
    assert!(value.is_finite());
    assert!(grad.iter().all(|g| g.is_finite()));
    assert!(hess.to_dense().iter().all(|h| h.is_finite()));
}

#[test]
fn composites_report_overflow_as_error() {
    // (det T - 1)^2 = 1e20 fits in f32, its square does not
    let t = Matrix3::<f32>::from_diagonal(&nalgebra::Vector3::new(1e10, 1.0, 1.0));
    assert!(SizeNB1.evaluate(&t).unwrap().is_finite());

    let squared = Squared::new(SizeNB1);
    assert_eq!(
        TargetMetric::<f32, U3>::evaluate(&squared, &t),
        Err(MetricError::NonFiniteResult {
            metric: "Squared",
            value: f32::INFINITY
        })
    );
    assert!(matches!(
        TargetMetric::<f32, U3>::evaluate_with_grad(&squared, &t),
        Err(MetricError::NonFiniteResult { metric: "Squared", .. })
    ));
    assert!(matches!(
        TargetMetric::<f32, U3>::evaluate_with_hess(&squared, &t),
        Err(MetricError::NonFiniteResult { metric: "Squared", .. })
    ));

    let scaled = Scale::new(1e30f32, SizeNB1).unwrap();
    assert!(matches!(
        TargetMetric::<f32, U3>::evaluate(&scaled, &t),
        Err(MetricError::NonFiniteResult { metric: "Scale", .. })
    ));
    let sum = Sum::new(scaled, SizeNB1);
    assert!(matches!(
        TargetMetric::<f32, U3>::evaluate_with_hess(&sum, &t),
        Err(MetricError::NonFiniteResult { metric: "Scale", .. })
    ));
}

#[test]
fn non_barrier_metrics_are_finite_for_inverted_tensors() {
    let inverted = matrix![1.0, 0.0, 0.0;
                           0.0, 1.0, 0.0;
                           0.0, 0.0, -2.0];
    let metrics: Vec<Box<dyn TargetMetric<f64, U3>>> = vec![
        Box::new(ShapeNB1),
        Box::new(ShapeOrientNB1),
        Box::new(ShapeSizeNB1::<f64>::default()),
        Box::new(SizeNB1),
        Box::new(ShapeSizeOrientNB1),
        Box::new(UntangleBeta::<f64>::default()),
    ];
    for metric in &metrics {
        assert_eq!(metric.kind(), MetricKind::NonBarrier);
        let (value, grad, _) = metric.evaluate_with_hess(&inverted).unwrap();
        assert!(value.is_finite());
        assert!(value > 0.0, "{} should penalize inversion", metric.name());
        assert!(grad.iter().all(|g| g.is_finite()));
    }
}

#[test]
fn minima_of_metrics() {
    let identity2 = Matrix2::<f64>::identity();
    let identity3 = Matrix3::<f64>::identity();
    let scaled3 = identity3 * 2.0;

    assert_scalar_eq!(TargetMetric::<f64, U3>::evaluate(&ShapeB1, &scaled3).unwrap(), 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(TargetMetric::<f64, U3>::evaluate(&ShapeNB1, &identity3).unwrap(), 0.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(TargetMetric::<f64, U3>::evaluate(&InverseMeanRatio, &scaled3).unwrap(), 0.0, comp = abs, tol = 1e-14);
    assert_eq!(ShapeOrientB2.evaluate(&scaled3), Ok(0.0));
    assert_eq!(ShapeOrientNB1.evaluate(&scaled3), Ok(0.0));
    assert_eq!(TargetMetric::<f64, U2>::evaluate(&ShapeSize2DB1, &identity2), Ok(0.0));
    assert_eq!(SizeB1.evaluate(&identity2), Ok(0.0));
    assert_eq!(SizeNB1.evaluate(&identity3), Ok(0.0));
    assert_eq!(ShapeSizeOrientB1.evaluate(&identity3), Ok(0.0));
    assert_eq!(ShapeSizeOrientNB1.evaluate(&identity2), Ok(0.0));
    assert_eq!(UntangleBeta::<f64>::default().evaluate(&identity3), Ok(0.0));
}

#[test]
fn untangle_beta_vanishes_above_threshold() {
    let metric = UntangleBeta::new(0.5).unwrap();
    let t = Matrix2::new(1.0, 0.2, 0.0, 0.6);
    let (value, grad, hess) = metric.evaluate_with_hess(&t).unwrap();
    assert_eq!(value, 0.0);
    assert_eq!(grad, Matrix2::zeros());
    assert_eq!(hess.to_dense(), nalgebra::DMatrix::zeros(4, 4));

    // tau = 0.25, so s = -0.25 and the metric is (2 * 0.25)^3
    let t = Matrix2::new(0.5, 0.0, 0.0, 0.5);
    assert_scalar_eq!(metric.evaluate(&t).unwrap(), 0.125, comp = float);
}

#[test]
fn invalid_parameters_are_rejected() {
    assert_eq!(
        ShapeSizeNB1::new(-1.0),
        Err(MetricError::InvalidParameter {
            metric: "ShapeSizeNB1",
            parameter: "gamma",
            value: -1.0,
            reason: "must be finite and non-negative",
        })
    );
    assert!(ShapeSizeNB1::new(f64::NAN).is_err());
    assert!(ShapeSizeNB1::new(f64::INFINITY).is_err());
    assert_eq!(ShapeSizeNB1::new(0.0).map(|m| m.gamma()), Ok(0.0));

    assert!(UntangleBeta::new(f64::INFINITY).is_err());
    assert!(UntangleBeta::new(f64::NAN).is_err());
    assert_eq!(UntangleBeta::new(-0.5).map(|m| m.epsilon()), Ok(-0.5));

    assert!(Scale::new(0.0, ShapeB1).is_err());
    assert!(Scale::new(-1.0, ShapeB1).is_err());
    assert!(Scale::new(f64::NAN, ShapeB1).is_err());
}

#[test]
fn composite_kinds() {
    assert_eq!(
        TargetMetric::<f64, U2>::kind(&Sum::new(ShapeNB1, SizeB1)),
        MetricKind::Barrier
    );
    assert_eq!(
        TargetMetric::<f64, U2>::kind(&Sum::new(ShapeNB1, SizeNB1)),
        MetricKind::NonBarrier
    );
    assert_eq!(
        TargetMetric::<f64, U3>::kind(&Squared::new(ShapeB1)),
        MetricKind::Barrier
    );
}

#[test]
fn composite_propagates_barrier_violation() {
    let inverted = matrix![-1.0, 0.0;
                           0.0, 1.0];
    let metric = Sum::new(ShapeNB1, ShapeB1);
    assert_eq!(
        metric.evaluate_with_hess(&inverted).unwrap_err(),
        MetricError::BarrierViolated {
            metric: ShapeB1::NAME,
            determinant: -1.0
        }
    );
}

proptest! {
    #[test]
    fn shape_b1_3d_is_invariant_to_rotation_and_scaling(
        t in barrier_tensor3(), r1 in rotation3(), r2 in rotation3(), scale in 0.5..2.0
    ) {
        let mu = TargetMetric::<f64, U3>::evaluate(&ShapeB1, &t).unwrap();
        let mu_transformed = TargetMetric::<f64, U3>::evaluate(&ShapeB1, &(r1 * t * r2 * scale)).unwrap();
        prop_assert!((mu - mu_transformed).abs() <= 1e-10 * (1.0 + mu.abs()));
        prop_assert!(mu >= -1e-12);
    }

    #[test]
    fn shape_b1_2d_is_invariant_to_rotation_and_scaling(
        t in barrier_tensor2(), r1 in rotation2(), r2 in rotation2(), scale in 0.5..2.0
    ) {
        let mu = TargetMetric::<f64, U2>::evaluate(&ShapeB1, &t).unwrap();
        let mu_transformed = TargetMetric::<f64, U2>::evaluate(&ShapeB1, &(r1 * t * r2 * scale)).unwrap();
        prop_assert!((mu - mu_transformed).abs() <= 1e-10 * (1.0 + mu.abs()));
        prop_assert!(mu >= -1e-12);
    }

    #[test]
    fn rotations_are_optimal_for_shape_size_metrics(r in rotation2()) {
        let mu = TargetMetric::<f64, U2>::evaluate(&ShapeSize2DB1, &r).unwrap();
        prop_assert!(mu.abs() <= 1e-12);
        let mu = TargetMetric::<f64, U2>::evaluate(&ShapeSizeNB1::<f64>::default(), &r).unwrap();
        prop_assert!(mu.abs() <= 1e-12);
    }

    #[test]
    fn non_barrier_metrics_are_non_negative(t in arbitrary_tensor::<U3>(-2.0..2.0)) {
        let metrics: [&dyn TargetMetric<f64, U3>; 4] = [&ShapeNB1, &ShapeOrientNB1, &SizeNB1, &ShapeSizeOrientNB1];
        for metric in metrics {
            prop_assert!(metric.evaluate(&t).unwrap() >= -1e-12);
        }
    }
}
