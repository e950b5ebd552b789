use approx::assert_relative_eq;
use forecast_math::linalg::least_squares;
use forecast_math::{welch_t_test, FiveNumberSummary, MinMaxScaler};

#[test]
fn test_welch_unequal_variances() {
    let a = [1.0, 2.0, 3.0, 4.0, 5.0];
    let b = [2.0, 4.0, 6.0, 8.0, 10.0];
    let result = welch_t_test(&a, &b).unwrap();

    // se^2 = 2.5 / 5 + 10 / 5
    assert_relative_eq!(result.statistic, -3.0 / 2.5_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(result.df, 6.25 / (0.25 / 4.0 + 4.0 / 4.0), epsilon = 1e-12);
    assert!(result.p_value > 0.10 && result.p_value < 0.115);

    let swapped = welch_t_test(&b, &a).unwrap();
    assert_relative_eq!(swapped.statistic, -result.statistic, epsilon = 1e-12);
    assert_relative_eq!(swapped.p_value, result.p_value, epsilon = 1e-12);
}

#[test]
fn test_welch_small_groups_give_nan() {
    let result = welch_t_test(&[1.0], &[2.0, 3.0]).unwrap();
    assert!(result.statistic.is_nan());
    assert!(result.p_value.is_nan());
}

#[test]
fn test_five_number_summary() {
    let summary = FiveNumberSummary::from_values(&[9.0, 1.0, 5.0, 3.0, 7.0, f64::NAN]).unwrap();
    assert_eq!(summary.count, 5);
    assert_eq!(summary.min, 1.0);
    assert_eq!(summary.q1, 3.0);
    assert_eq!(summary.median, 5.0);
    assert_eq!(summary.q3, 7.0);
    assert_eq!(summary.max, 9.0);
    assert!(FiveNumberSummary::from_values(&[]).is_err());
}

#[test]
fn test_scaler_inverts() {
    let values = [120.0, 80.0, 100.0];
    let scaler = MinMaxScaler::fit(&values).unwrap();
    let scaled = scaler.transform(&values);
    assert_eq!(scaled, vec![1.0, 0.0, 0.5]);

    let restored = scaler.inverse_transform(&scaled);
    for (r, v) in restored.iter().zip(values) {
        assert_relative_eq!(*r, v, epsilon = 1e-12);
    }
}

#[test]
fn test_least_squares_recovers_line() {
    let design: Vec<Vec<f64>> = (0..6).map(|x| vec![1.0, x as f64]).collect();
    let targets: Vec<f64> = (0..6).map(|x| 2.0 + 0.5 * x as f64).collect();
    let beta = least_squares(&design, &targets).unwrap();
    assert_relative_eq!(beta[0], 2.0, epsilon = 1e-9);
    assert_relative_eq!(beta[1], 0.5, epsilon = 1e-9);
}
