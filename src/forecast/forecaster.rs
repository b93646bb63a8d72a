use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::series::CostSeries;
use super::stats::{ewma, linear_trend, mean};

/// Minimum history window required for a trend projection.
pub const DEFAULT_MIN_HISTORY: usize = 7;

/// Smoothing factor for the exponentially weighted level.
const LEVEL_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Success,
    InsufficientData,
    EmptySeries,
}

/// How the projection was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    /// Least-squares slope plus exponentially weighted level.
    Trend,
    /// Flat projection of the historical mean.
    FlatMean,
    /// No projection produced.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub status: ForecastStatus,
    /// Projected daily costs, one per forecast day, each >= 0.
    pub forecast: Vec<f64>,
    pub forecast_mean: f64,
    pub method: ForecastMethod,
}

/// A category left out of an aggregate forecast, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCategory {
    pub category: String,
    pub reason: String,
}

/// Aggregate forecast across cost categories.
///
/// Categories with insufficient history are excluded from `total_forecast`
/// and reported in `skipped`, never silently zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateForecast {
    pub total_forecast: Vec<f64>,
    pub by_category: BTreeMap<String, ForecastResult>,
    pub skipped: Vec<SkippedCategory>,
}

/// Project future daily cost from a historical series.
///
/// Requires at least `DEFAULT_MIN_HISTORY` points for a trend projection;
/// with fewer the result carries a non-success status instead of failing.
pub fn forecast_service_cost(historical: &CostSeries, forecast_days: usize) -> ForecastResult {
    forecast_service_cost_with_window(historical, forecast_days, DEFAULT_MIN_HISTORY)
}

/// Window-parameterized variant of [`forecast_service_cost`].
pub fn forecast_service_cost_with_window(
    historical: &CostSeries,
    forecast_days: usize,
    min_history: usize,
) -> ForecastResult {
    let values = historical.values();

    if values.is_empty() {
        return ForecastResult {
            status: ForecastStatus::EmptySeries,
            forecast: Vec::new(),
            forecast_mean: 0.0,
            method: ForecastMethod::None,
        };
    }
    if values.len() < min_history {
        debug!(
            points = values.len(),
            min_history, "History too short for trend projection"
        );
        return ForecastResult {
            status: ForecastStatus::InsufficientData,
            forecast: Vec::new(),
            forecast_mean: mean(&values).max(0.0),
            method: ForecastMethod::None,
        };
    }

    let historical_mean = mean(&values);
    let (forecast, method) = match (linear_trend(&values), ewma(&values, LEVEL_ALPHA)) {
        (Some((slope, _)), Some(level)) if slope.is_finite() && level.is_finite() => {
            let projected = (0..forecast_days)
                .map(|step| (level + slope * (step + 1) as f64).max(0.0))
                .collect();
            (projected, ForecastMethod::Trend)
        }
        _ => {
            // Degenerate fit: degrade to a flat-mean projection
            let flat = historical_mean.max(0.0);
            (vec![flat; forecast_days], ForecastMethod::FlatMean)
        }
    };

    let mut forecast_mean = mean(&forecast);
    if forecast_mean <= 0.0 {
        // A trend that bottoms out at zero must not hide that the service
        // has real historical spend
        forecast_mean = historical_mean.max(0.0);
    }

    ForecastResult {
        status: ForecastStatus::Success,
        forecast,
        forecast_mean,
        method,
    }
}

/// Forecast each category independently and sum per-day projections.
pub fn forecast_aggregated_costs(
    series_by_category: &BTreeMap<String, CostSeries>,
    forecast_days: usize,
) -> AggregateForecast {
    forecast_aggregated_costs_with_window(series_by_category, forecast_days, DEFAULT_MIN_HISTORY)
}

pub fn forecast_aggregated_costs_with_window(
    series_by_category: &BTreeMap<String, CostSeries>,
    forecast_days: usize,
    min_history: usize,
) -> AggregateForecast {
    let mut total_forecast = vec![0.0; forecast_days];
    let mut by_category = BTreeMap::new();
    let mut skipped = Vec::new();

    for (category, series) in series_by_category {
        let result = forecast_service_cost_with_window(series, forecast_days, min_history);
        match result.status {
            ForecastStatus::Success => {
                for (day, projected) in result.forecast.iter().enumerate() {
                    total_forecast[day] += projected;
                }
                by_category.insert(category.clone(), result);
            }
            ForecastStatus::InsufficientData => {
                skipped.push(SkippedCategory {
                    category: category.clone(),
                    reason: format!(
                        "insufficient history: {} of {} required points",
                        series.len(),
                        min_history
                    ),
                });
            }
            ForecastStatus::EmptySeries => {
                skipped.push(SkippedCategory {
                    category: category.clone(),
                    reason: "empty series".to_string(),
                });
            }
        }
    }

    AggregateForecast {
        total_forecast,
        by_category,
        skipped,
    }
}
