use std::collections::BTreeMap;
use std::path::Path;

use super::analyze::load_config;
use super::commands::ForecastArgs;
use crate::errors::CostScopeError;
use crate::forecast::{
    detect_anomalies_with_threshold, forecast_aggregated_costs_with_window, AnomalyReport,
    CostSeries,
};
use crate::report::{format_anomaly_report, format_forecast};

pub async fn handle_forecast(args: ForecastArgs) -> Result<(), CostScopeError> {
    let config = load_config(args.config.as_deref()).await?;
    let mut settings = config.forecast_settings();
    if let Some(days) = args.days {
        settings.horizon_days = days;
    }
    if let Some(threshold) = args.threshold {
        settings.anomaly_threshold = threshold;
    }

    let series_by_category = load_series(Path::new(&args.input)).await?;

    let aggregate = forecast_aggregated_costs_with_window(
        &series_by_category,
        settings.horizon_days,
        settings.min_history,
    );
    let anomalies: BTreeMap<String, AnomalyReport> = series_by_category
        .iter()
        .map(|(category, series)| {
            (
                category.clone(),
                detect_anomalies_with_threshold(series, settings.anomaly_threshold),
            )
        })
        .collect();

    if args.json {
        let payload = serde_json::json!({
            "forecast": aggregate,
            "anomalies": anomalies,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", format_forecast(&aggregate));
    println!("Anomalous days:");
    for (category, report) in &anomalies {
        print!("{}", format_anomaly_report(category, report));
    }
    Ok(())
}

/// Input format: JSON object mapping category name to an array of
/// consecutive daily costs, oldest first.
async fn load_series(path: &Path) -> Result<BTreeMap<String, CostSeries>, CostScopeError> {
    if !path.exists() {
        return Err(CostScopeError::InvalidInput(format!(
            "input file not found: {}",
            path.display()
        )));
    }
    let content = tokio::fs::read_to_string(path).await?;
    let raw: BTreeMap<String, Vec<f64>> = serde_json::from_str(&content)?;

    let mut series_by_category = BTreeMap::new();
    for (category, costs) in raw {
        let series = CostSeries::from_daily_costs(0, &costs).map_err(|e| {
            CostScopeError::InvalidInput(format!("category '{category}': {e}"))
        })?;
        series_by_category.insert(category, series);
    }
    Ok(series_by_category)
}
