use nalgebra::{Matrix2, U2};
use proptest::collection::vec;
use proptest::prelude::*;
use tmetric::batch::{evaluate_all, par_evaluate_all, par_evaluate_all_with_grad, par_sum};
use tmetric::metrics::{ShapeB1, ShapeNB1};
use tmetric::proptest::arbitrary_tensor;
use tmetric::{MetricConfig, TargetMetric};

#[test]
fn batch_reports_one_result_per_tensor() {
    let tensors = vec![
        Matrix2::identity(),
        Matrix2::new(0.0, 1.0, 1.0, 0.0),
        Matrix2::new(2.0, 0.0, 0.0, 1.0),
    ];
    let results = evaluate_all(&ShapeB1, &tensors);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(0.0));
    assert!(results[1].as_ref().unwrap_err().is_barrier_violation());
    assert_eq!(results[2], Ok(0.25));

    assert_eq!(par_evaluate_all(&ShapeB1, &tensors), results);
    assert!(par_sum(&ShapeB1, &tensors).unwrap_err().is_barrier_violation());
}

#[test]
fn batch_accepts_boxed_metrics() {
    let metric = MetricConfig::ShapeNB1.build_2d::<f64>().unwrap();
    let tensors = vec![Matrix2::identity(); 4];
    let results = par_evaluate_all_with_grad(metric.as_ref(), &tensors);
    for result in results {
        assert_eq!(result, Ok((0.0, Matrix2::zeros())));
    }
}

proptest! {
    #[test]
    fn parallel_and_sequential_evaluation_agree(tensors in vec(arbitrary_tensor::<U2>(-2.0..2.0), 0..50)) {
        let sequential = evaluate_all(&ShapeNB1, &tensors);
        prop_assert_eq!(par_evaluate_all(&ShapeNB1, &tensors), sequential.clone());

        let with_grad = par_evaluate_all_with_grad(&ShapeNB1, &tensors);
        for ((result, value), t) in with_grad.iter().zip(&sequential).zip(&tensors) {
            prop_assert_eq!(result.as_ref().map(|(value, _)| *value), value.as_ref().copied());
            prop_assert_eq!(result, &ShapeNB1.evaluate_with_grad(t));
        }

        let sum: f64 = sequential.iter().map(|value| value.clone().unwrap()).sum();
        let total = par_sum(&ShapeNB1, &tensors).unwrap();
        prop_assert!((sum - total).abs() <= 1e-10 * (1.0 + sum.abs()));
    }
}
