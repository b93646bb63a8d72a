use super::types::CostScopeError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl CostScopeError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            CostScopeError::Probe(_) => ErrorClassification {
                error_type: "ProbeError",
                retryable: true,
            },
            CostScopeError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            CostScopeError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },
            CostScopeError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: true,
            },

            // Non-retryable errors
            CostScopeError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            CostScopeError::Integrity(_) => ErrorClassification {
                error_type: "IntegrityError",
                retryable: false,
            },
            CostScopeError::InvalidInput(_) => ErrorClassification {
                error_type: "InvalidInputError",
                retryable: false,
            },
            CostScopeError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            CostScopeError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
        }
    }
}
