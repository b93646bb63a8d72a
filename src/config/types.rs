use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CostScopeConfig {
    pub pipeline: Option<PipelineConfig>,
    pub forecast: Option<ForecastConfig>,
    pub accounts: Option<Vec<String>>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PipelineConfig {
    pub batch_size: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ForecastConfig {
    pub horizon_days: Option<usize>,
    pub anomaly_threshold: Option<f64>,
    pub min_history: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub format: Option<String>,
}

/// Pipeline settings with defaults applied.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub batch_size: usize,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub max_retries: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
            max_retries: 2,
        }
    }
}

/// Forecast settings with defaults applied.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub horizon_days: usize,
    pub anomaly_threshold: f64,
    pub min_history: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            anomaly_threshold: crate::forecast::DEFAULT_ANOMALY_THRESHOLD,
            min_history: crate::forecast::DEFAULT_MIN_HISTORY,
        }
    }
}

impl CostScopeConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        let defaults = PipelineSettings::default();
        match &self.pipeline {
            None => defaults,
            Some(p) => PipelineSettings {
                batch_size: p.batch_size.unwrap_or(defaults.batch_size),
                timeout: p
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
                poll_interval: p
                    .poll_interval_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.poll_interval),
                max_retries: p.max_retries.unwrap_or(defaults.max_retries),
            },
        }
    }

    pub fn forecast_settings(&self) -> ForecastSettings {
        let defaults = ForecastSettings::default();
        match &self.forecast {
            None => defaults,
            Some(f) => ForecastSettings {
                horizon_days: f.horizon_days.unwrap_or(defaults.horizon_days),
                anomaly_threshold: f.anomaly_threshold.unwrap_or(defaults.anomaly_threshold),
                min_history: f.min_history.unwrap_or(defaults.min_history),
            },
        }
    }
}
