use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::probe::{ProbeError, ProbeErrorKind, ProbeId, ProbeReport};
use super::recommendation::Recommendation;
use super::summary::RunMetrics;

/// A fixed-size group of probes dispatched together to one worker.
///
/// Immutable once planned; consumed exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub probe_ids: Vec<ProbeId>,
}

/// The full partitioning of a catalog into batches for one mapping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub execution_id: String,
    pub batches: Vec<Batch>,
    pub total_services: usize,
    pub total_batches: usize,
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    pub fn batch_ids(&self) -> Vec<String> {
        self.batches.iter().map(|b| b.batch_id.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCosts {
    pub by_service: BTreeMap<ProbeId, f64>,
    pub by_category: BTreeMap<String, f64>,
}

/// The result one worker returns for one batch.
///
/// May be partial: a `false` entry in `services` is a soft per-probe
/// failure, not a batch failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub services: BTreeMap<ProbeId, bool>,
    pub costs: BatchCosts,
    pub recommendations: Vec<Recommendation>,
    pub metrics: RunMetrics,
    pub errors: Vec<ProbeError>,
}

impl BatchResult {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            services: BTreeMap::new(),
            costs: BatchCosts::default(),
            recommendations: Vec::new(),
            metrics: RunMetrics::default(),
            errors: Vec::new(),
        }
    }

    /// Fold one successful probe report into this batch result.
    pub fn record_report(&mut self, report: ProbeReport) {
        self.services.insert(report.probe_id.clone(), true);
        *self.costs.by_service.entry(report.probe_id.clone()).or_insert(0.0) +=
            report.monthly_cost;
        *self.costs
            .by_category
            .entry(report.category.as_str().to_string())
            .or_insert(0.0) += report.monthly_cost;
        self.metrics.resources_analyzed += report.resources_analyzed;
        self.metrics.anomalies_detected += report.anomalies_detected;
        self.metrics.optimizations_found += report.optimizations_found;
        self.recommendations.extend(report.recommendations);
    }

    /// Record a probe that failed fatally before producing any data.
    ///
    /// Its resources do not count toward `resources_analyzed`.
    pub fn record_failure(&mut self, probe_id: ProbeId, kind: ProbeErrorKind, message: String) {
        self.services.insert(probe_id.clone(), false);
        self.metrics.soft_failures += 1;
        self.errors.push(ProbeError { probe_id, kind, message });
    }
}
