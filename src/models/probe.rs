use serde::{Deserialize, Serialize};

/// Identifier of one AWS-service cost/resource inspection unit.
///
/// Opaque to the pipeline: the catalog defines membership and order, the
/// probe registry maps it to an implementation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeId(pub String);

impl ProbeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProbeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProbeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse AWS service category used as the `by_category` cost key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeCategory {
    Compute,
    Storage,
    Database,
    Networking,
    Analytics,
    Security,
    Integration,
    Management,
    Other,
}

impl ProbeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Storage => "storage",
            Self::Database => "database",
            Self::Networking => "networking",
            Self::Analytics => "analytics",
            Self::Security => "security",
            Self::Integration => "integration",
            Self::Management => "management",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ProbeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one probe returns when it runs without fatal error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub probe_id: ProbeId,
    pub category: ProbeCategory,
    /// Estimated monthly cost attributed to this service, in USD.
    pub monthly_cost: f64,
    pub resources_analyzed: u64,
    pub anomalies_detected: u64,
    pub optimizations_found: u64,
    pub recommendations: Vec<super::recommendation::Recommendation>,
}

/// Kind of failure a probe reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    AccessDenied,
    Throttled,
    ApiFailure,
    Timeout,
    Other,
}

/// A soft per-probe failure recorded inside a batch result.
///
/// Never fails the batch: the rest of the batch still aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeError {
    pub probe_id: ProbeId,
    pub kind: ProbeErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_id_display() {
        let id = ProbeId::new("ec2");
        assert_eq!(id.to_string(), "ec2");
        assert_eq!(id.as_str(), "ec2");
    }

    #[test]
    fn test_probe_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ProbeId::new("rds")).unwrap();
        assert_eq!(json, "\"rds\"");
        let parsed: ProbeId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ProbeId::new("rds"));
    }

    #[test]
    fn test_category_as_str() {
        assert_eq!(ProbeCategory::Compute.as_str(), "compute");
        assert_eq!(ProbeCategory::Database.as_str(), "database");
    }

    #[test]
    fn test_probe_error_kind_deserialize() {
        let parsed: ProbeErrorKind = serde_json::from_str("\"access_denied\"").unwrap();
        assert_eq!(parsed, ProbeErrorKind::AccessDenied);
    }
}
