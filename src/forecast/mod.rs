//! Cost forecasting and anomaly detection.
//!
//! Stateless pure functions over validated daily cost series: trend
//! projection of future spend and deviation-score flagging of anomalous
//! historical days. Classical statistics only; no I/O.

pub mod anomaly;
pub mod forecaster;
pub mod series;
pub mod stats;

pub use anomaly::{
    detect_anomalies, detect_anomalies_with_threshold, AnomalyPoint, AnomalyReport,
    DEFAULT_ANOMALY_THRESHOLD,
};
pub use forecaster::{
    forecast_aggregated_costs, forecast_aggregated_costs_with_window, forecast_service_cost,
    forecast_service_cost_with_window, AggregateForecast, ForecastMethod, ForecastResult,
    ForecastStatus, SkippedCategory, DEFAULT_MIN_HISTORY,
};
pub use series::{CostPoint, CostSeries};
