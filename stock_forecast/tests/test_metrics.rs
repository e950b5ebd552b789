use approx::assert_relative_eq;
use rstest::rstest;
use stock_forecast::metrics::evaluate_model;
use stock_forecast::ForecastError;

#[rstest]
#[case(vec![10.0, 20.0, 30.0], vec![11.0, 19.0, 33.0])]
#[case(vec![1.0, 1.0, 1.0, 1.0], vec![5.0, 1.0, 1.0, 1.0])]
#[case(vec![-3.0, 2.5], vec![4.0, 2.5])]
#[case(vec![100.0], vec![90.0])]
fn test_rmse_bounds_mae(#[case] actual: Vec<f64>, #[case] predicted: Vec<f64>) {
    let metrics = evaluate_model(&actual, &predicted).unwrap();
    assert!(metrics.mae >= 0.0);
    assert!(metrics.rmse >= 0.0);
    assert!(metrics.rmse >= metrics.mae - 1e-12);
}

#[test]
fn test_perfect_forecast() {
    let actual = vec![101.5, 99.0, 100.25, 102.0];
    let metrics = evaluate_model(&actual, &actual).unwrap();
    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.rmse, 0.0);
    assert_eq!(metrics.mape, 0.0);
}

#[test]
fn test_shape_mismatch() {
    let result = evaluate_model(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
    assert!(matches!(
        result,
        Err(ForecastError::ShapeMismatch {
            actual: 3,
            predicted: 2
        })
    ));
}

#[test]
fn test_empty_series() {
    assert!(matches!(
        evaluate_model(&[], &[]),
        Err(ForecastError::EmptySeries(_))
    ));
}

#[test]
fn test_zero_actual_gives_non_finite_mape() {
    let metrics = evaluate_model(&[0.0, 1.0, 2.0], &[0.0, 1.0, 3.0]).unwrap();
    assert!(!metrics.mape.is_finite());
    assert_relative_eq!(metrics.mae, 1.0 / 3.0);
    assert_relative_eq!(metrics.rmse, (1.0_f64 / 3.0).sqrt());
}
