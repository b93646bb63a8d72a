use std::collections::{BTreeMap, BTreeSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probe::ProbeId;
use super::recommendation::Recommendation;

/// Outcome of one analysis run. Consumers must branch on this rather than
/// assume completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters summed additively across batches and accounts.
///
/// `soft_failures` counts probes that failed fatally before producing data;
/// those are excluded from the `resources_analyzed` denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub resources_analyzed: u64,
    pub anomalies_detected: u64,
    pub optimizations_found: u64,
    pub soft_failures: u64,
}

impl RunMetrics {
    pub fn merge(&mut self, other: &RunMetrics) {
        self.resources_analyzed += other.resources_analyzed;
        self.anomalies_detected += other.anomalies_detected;
        self.optimizations_found += other.optimizations_found;
        self.soft_failures += other.soft_failures;
    }
}

/// The merged, possibly-partial result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub execution_id: String,
    pub status: RunStatus,
    pub total_cost: f64,
    pub cost_by_service: BTreeMap<ProbeId, f64>,
    pub cost_by_category: BTreeMap<String, f64>,
    pub recommendations: Vec<Recommendation>,
    pub metrics: RunMetrics,
    pub total_batches: usize,
    pub missing_batches: BTreeSet<String>,
    pub generated_at: DateTime<Utc>,
}

/// RunSummary scoped to one AWS account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRunSummary {
    pub account_id: String,
    #[serde(flatten)]
    pub summary: RunSummary,
}

/// Run summaries merged across multiple AWS accounts, with the per-account
/// breakdown retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossAccountSummary {
    pub status: RunStatus,
    pub total_cost: f64,
    pub cost_by_service: BTreeMap<ProbeId, f64>,
    pub cost_by_category: BTreeMap<String, f64>,
    pub recommendations: Vec<Recommendation>,
    pub metrics: RunMetrics,
    pub accounts: Vec<AccountRunSummary>,
    pub accounts_count: usize,
    pub batches_count: usize,
    pub generated_at: DateTime<Utc>,
}
