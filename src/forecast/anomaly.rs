use serde::{Deserialize, Serialize};

use super::series::CostSeries;
use super::stats::{mean, std_dev};

/// Deviation-score threshold above which a point is flagged anomalous.
///
/// 2.5 flags a single ~5x daily spike inside an 8-day window while leaving
/// ordinary day-to-day noise alone.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.5;

const STD_EPSILON: f64 = 1e-9;

/// A cost-series data point whose deviation from central tendency exceeds
/// the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub index: usize,
    pub value: f64,
    pub deviation_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies_detected: Vec<AnomalyPoint>,
    pub total_anomalies: usize,
}

/// Flag points deviating more than the default threshold from the series
/// mean, in units of standard deviation.
pub fn detect_anomalies(historical: &CostSeries) -> AnomalyReport {
    detect_anomalies_with_threshold(historical, DEFAULT_ANOMALY_THRESHOLD)
}

/// Threshold-parameterized variant. Never fails for a well-formed series:
/// a constant series (zero spread) reports zero anomalies instead of
/// dividing by zero.
pub fn detect_anomalies_with_threshold(historical: &CostSeries, threshold: f64) -> AnomalyReport {
    let values = historical.values();
    if values.is_empty() {
        return AnomalyReport::default();
    }

    let m = mean(&values);
    let sd = std_dev(&values);
    if sd < STD_EPSILON {
        // Constant series: nothing deviates
        return AnomalyReport::default();
    }

    let anomalies_detected: Vec<AnomalyPoint> = values
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let deviation_score = (value - m).abs() / sd;
            (deviation_score > threshold).then_some(AnomalyPoint {
                index,
                value,
                deviation_score,
            })
        })
        .collect();

    AnomalyReport {
        total_anomalies: anomalies_detected.len(),
        anomalies_detected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(costs: &[f64]) -> CostSeries {
        CostSeries::from_daily_costs(0, costs).unwrap()
    }

    #[test]
    fn test_flat_series_has_no_anomalies() {
        let report = detect_anomalies(&series(&[100.0; 8]));
        assert_eq!(report.total_anomalies, 0);
        assert!(report.anomalies_detected.is_empty());
    }

    #[test]
    fn test_spike_is_flagged() {
        let report = detect_anomalies(&series(&[
            100.0, 101.0, 102.0, 101.0, 100.0, 500.0, 102.0, 101.0,
        ]));
        assert_eq!(report.total_anomalies, 1);
        let spike = &report.anomalies_detected[0];
        assert_eq!(spike.index, 5);
        assert_eq!(spike.value, 500.0);
        assert!(spike.deviation_score > DEFAULT_ANOMALY_THRESHOLD);
    }

    #[test]
    fn test_empty_series_reports_nothing() {
        let report = detect_anomalies(&CostSeries::new(Vec::new()).unwrap());
        assert_eq!(report.total_anomalies, 0);
    }

    #[test]
    fn test_total_matches_list_length() {
        let report = detect_anomalies(&series(&[
            10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 400.0,
        ]));
        assert_eq!(report.total_anomalies, report.anomalies_detected.len());
        assert_eq!(report.total_anomalies, 1);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let s = series(&[100.0, 101.0, 102.0, 101.0, 100.0, 130.0, 102.0, 101.0]);
        let strict = detect_anomalies_with_threshold(&s, 10.0);
        assert_eq!(strict.total_anomalies, 0);
        let loose = detect_anomalies_with_threshold(&s, 1.5);
        assert!(loose.total_anomalies >= 1);
    }

    #[test]
    fn test_ordinary_noise_not_flagged() {
        let report = detect_anomalies(&series(&[98.0, 101.0, 99.0, 102.0, 100.0, 97.0, 103.0]));
        assert_eq!(report.total_anomalies, 0);
    }
}
