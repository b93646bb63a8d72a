use std::path::Path;
use crate::errors::CostScopeError;
use super::types::CostScopeConfig;

pub async fn parse_config(path: &Path) -> Result<CostScopeConfig, CostScopeError> {
    if !path.exists() {
        return Err(CostScopeError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CostScopeError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: CostScopeConfig = serde_yaml::from_str(&content)?;

    validate_semantics(&config)?;

    Ok(config)
}

/// Reject values the pipeline cannot run with. These are fatal and must be
/// fixed before retry.
fn validate_semantics(config: &CostScopeConfig) -> Result<(), CostScopeError> {
    if let Some(pipeline) = &config.pipeline {
        if pipeline.batch_size == Some(0) {
            return Err(CostScopeError::Config(
                "pipeline.batch_size must be a positive integer".into(),
            ));
        }
        if pipeline.timeout_secs == Some(0) {
            return Err(CostScopeError::Config(
                "pipeline.timeout_secs must be positive".into(),
            ));
        }
    }

    if let Some(forecast) = &config.forecast {
        if forecast.horizon_days == Some(0) {
            return Err(CostScopeError::Config(
                "forecast.horizon_days must be positive".into(),
            ));
        }
        if let Some(threshold) = forecast.anomaly_threshold {
            if threshold <= 0.0 || !threshold.is_finite() {
                return Err(CostScopeError::Config(
                    "forecast.anomaly_threshold must be a positive number".into(),
                ));
            }
        }
        if forecast.min_history == Some(0) {
            return Err(CostScopeError::Config(
                "forecast.min_history must be positive".into(),
            ));
        }
    }

    if let Some(accounts) = &config.accounts {
        if accounts.iter().any(|a| a.trim().is_empty()) {
            return Err(CostScopeError::Config("accounts must not contain empty ids".into()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_parse_valid_config() {
        let file = write_config(
            "pipeline:\n  batch_size: 25\n  timeout_secs: 120\nforecast:\n  horizon_days: 14\naccounts:\n  - \"111111111111\"\n  - \"222222222222\"\n",
        );
        let config = parse_config(file.path()).await.unwrap();
        assert_eq!(config.pipeline_settings().batch_size, 25);
        assert_eq!(config.forecast_settings().horizon_days, 14);
        assert_eq!(config.accounts.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let err = parse_config(Path::new("/nonexistent/costscope.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, CostScopeError::Config(_)));
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let file = write_config("pipeline:\n  batch_size: 0\n");
        let err = parse_config(file.path()).await.unwrap_err();
        assert!(matches!(err, CostScopeError::Config(_)));
    }

    #[tokio::test]
    async fn test_negative_threshold_rejected() {
        let file = write_config("forecast:\n  anomaly_threshold: -1.0\n");
        let err = parse_config(file.path()).await.unwrap_err();
        assert!(matches!(err, CostScopeError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_account_rejected() {
        let file = write_config("accounts:\n  - \"111111111111\"\n  - \"\"\n");
        let err = parse_config(file.path()).await.unwrap_err();
        assert!(matches!(err, CostScopeError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_config_is_valid() {
        let file = write_config("{}\n");
        let config = parse_config(file.path()).await.unwrap();
        assert_eq!(config.pipeline_settings().batch_size, 20);
    }
}
