use std::collections::BTreeMap;

use costscope::forecast::{
    detect_anomalies, forecast_aggregated_costs, forecast_service_cost, CostSeries,
    ForecastStatus,
};

fn series(costs: &[f64]) -> CostSeries {
    CostSeries::from_daily_costs(0, costs).unwrap()
}

#[test]
fn forecast_shape_holds_for_varied_histories() {
    let histories: Vec<Vec<f64>> = vec![
        vec![100.0; 7],
        (0..30).map(|d| 50.0 + d as f64).collect(),
        (0..365).map(|d| 200.0 + (d % 7) as f64 * 3.0).collect(),
        vec![0.0; 14],
    ];

    for history in histories {
        for days in [1usize, 7, 30, 90] {
            let result = forecast_service_cost(&series(&history), days);
            assert_eq!(result.status, ForecastStatus::Success);
            assert_eq!(result.forecast.len(), days);
            assert!(result.forecast.iter().all(|v| *v >= 0.0));
        }
    }
}

#[test]
fn flat_series_forecast_is_stable() {
    let result = forecast_service_cost(&series(&[100.0; 8]), 10);
    assert!((result.forecast_mean - 100.0).abs() < 1e-6);
    for value in &result.forecast {
        assert!((value - 100.0).abs() < 1e-6);
    }
}

#[test]
fn insufficient_history_is_typed_not_panicking() {
    for n in 0..7usize {
        let history: Vec<f64> = vec![10.0; n];
        let result = forecast_service_cost(&series(&history), 5);
        assert_ne!(result.status, ForecastStatus::Success);
        assert!(result.forecast.is_empty());
    }
}

#[test]
fn flat_series_has_no_anomalies() {
    let report = detect_anomalies(&series(&[100.0; 8]));
    assert_eq!(report.total_anomalies, 0);
}

#[test]
fn spiked_series_flags_the_spike() {
    let report = detect_anomalies(&series(&[
        100.0, 101.0, 102.0, 101.0, 100.0, 500.0, 102.0, 101.0,
    ]));
    assert!(report
        .anomalies_detected
        .iter()
        .any(|a| a.index == 5 && a.value == 500.0));
    assert_eq!(report.total_anomalies, report.anomalies_detected.len());
}

#[test]
fn aggregated_forecast_is_additive_per_day() {
    let ec2: Vec<f64> = (0..30).map(|d| 100.0 + d as f64).collect();
    let rds: Vec<f64> = (0..30).map(|d| 40.0 + (d % 5) as f64).collect();

    let mut by_category = BTreeMap::new();
    by_category.insert("ec2".to_string(), series(&ec2));
    by_category.insert("rds".to_string(), series(&rds));

    let days = 14;
    let aggregate = forecast_aggregated_costs(&by_category, days);
    let ec2_alone = forecast_service_cost(&series(&ec2), days);
    let rds_alone = forecast_service_cost(&series(&rds), days);

    assert_eq!(aggregate.total_forecast.len(), days);
    for day in 0..days {
        let expected = ec2_alone.forecast[day] + rds_alone.forecast[day];
        assert!(
            (aggregate.total_forecast[day] - expected).abs() < 1e-9,
            "day {day}: {} != {}",
            aggregate.total_forecast[day],
            expected
        );
    }
}

#[test]
fn aggregate_excludes_and_reports_short_categories() {
    let mut by_category = BTreeMap::new();
    by_category.insert("ec2".to_string(), series(&[100.0; 10]));
    by_category.insert("new-service".to_string(), series(&[3.0, 4.0]));

    let aggregate = forecast_aggregated_costs(&by_category, 7);
    assert_eq!(aggregate.skipped.len(), 1);
    assert_eq!(aggregate.skipped[0].category, "new-service");
    assert!(!aggregate.by_category.contains_key("new-service"));
    // ec2 alone drives the total; the short category is annotated, not zeroed
    assert!(aggregate.total_forecast[0] > 90.0);
}
