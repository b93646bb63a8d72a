use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostScopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
