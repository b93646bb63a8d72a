use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::CostScopeError;
use crate::models::{
    deduplicate_recommendations, BatchResult, ProbeId, Recommendation, RunMetrics, RunStatus,
    RunSummary,
};

/// Merges batch results into one run summary, tolerant of partial data.
///
/// Exclusively owns the summary for its execution id. Merging is
/// commutative, associative and idempotent: completion order does not
/// matter, and at-least-once delivery from the dispatch layer is safe.
pub struct ResultAggregator {
    execution_id: String,
    expected: BTreeSet<String>,
    merged: BTreeSet<String>,
    cost_by_service: BTreeMap<ProbeId, f64>,
    cost_by_category: BTreeMap<String, f64>,
    recommendations: Vec<Recommendation>,
    metrics: RunMetrics,
}

impl ResultAggregator {
    pub fn new(execution_id: impl Into<String>, expected_batch_ids: BTreeSet<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            expected: expected_batch_ids,
            merged: BTreeSet::new(),
            cost_by_service: BTreeMap::new(),
            cost_by_category: BTreeMap::new(),
            recommendations: Vec::new(),
            metrics: RunMetrics::default(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Merge one batch result into the running summary.
    ///
    /// Returns Ok(true) if the result was applied, Ok(false) for a no-op
    /// (already-merged or unexpected batch id). A probe id that already has
    /// a cost entry from another batch indicates a planning defect and
    /// raises an integrity error instead of silently overwriting.
    pub fn merge(&mut self, result: BatchResult) -> Result<bool, CostScopeError> {
        if self.merged.contains(&result.batch_id) {
            debug!(
                execution_id = %self.execution_id,
                batch_id = %result.batch_id,
                "Duplicate batch delivery ignored"
            );
            return Ok(false);
        }
        if !self.expected.contains(&result.batch_id) {
            warn!(
                execution_id = %self.execution_id,
                batch_id = %result.batch_id,
                "Batch result for unknown batch id ignored"
            );
            return Ok(false);
        }

        // Collision check before any mutation so a defective result leaves
        // the summary untouched.
        for probe_id in result.costs.by_service.keys() {
            if self.cost_by_service.contains_key(probe_id) {
                return Err(CostScopeError::Integrity(format!(
                    "probe '{}' reported by more than one batch in execution '{}'",
                    probe_id, self.execution_id
                )));
            }
        }

        for (probe_id, cost) in result.costs.by_service {
            self.cost_by_service.insert(probe_id, cost);
        }
        for (category, cost) in result.costs.by_category {
            *self.cost_by_category.entry(category).or_insert(0.0) += cost;
        }
        self.recommendations.extend(result.recommendations);
        self.metrics.merge(&result.metrics);
        self.merged.insert(result.batch_id.clone());

        debug!(
            execution_id = %self.execution_id,
            batch_id = %result.batch_id,
            merged = self.merged.len(),
            expected = self.expected.len(),
            "Batch result merged"
        );
        Ok(true)
    }

    /// True once every expected batch id has been merged.
    pub fn is_complete(&self) -> bool {
        self.merged.len() == self.expected.len()
    }

    pub fn missing_batches(&self) -> BTreeSet<String> {
        self.expected.difference(&self.merged).cloned().collect()
    }

    fn status(&self) -> RunStatus {
        if self.merged.is_empty() {
            RunStatus::Failed
        } else if self.is_complete() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }

    /// Current state as a summary, without sealing the run. Used by poll
    /// style callers that keep delivering results across invocations.
    pub fn snapshot(&self) -> RunSummary {
        self.build_summary()
    }

    /// Seal the run: no more results will be considered.
    pub fn seal(self) -> RunSummary {
        let summary = self.build_summary();
        match summary.status {
            RunStatus::Success => info!(
                execution_id = %summary.execution_id,
                total_cost = summary.total_cost,
                "Run complete"
            ),
            RunStatus::Partial => warn!(
                execution_id = %summary.execution_id,
                missing = summary.missing_batches.len(),
                "Run sealed with missing batches"
            ),
            RunStatus::Failed => warn!(
                execution_id = %summary.execution_id,
                "Run sealed with no batch results"
            ),
        }
        summary
    }

    fn build_summary(&self) -> RunSummary {
        let total_cost = self.cost_by_service.values().sum();
        RunSummary {
            execution_id: self.execution_id.clone(),
            status: self.status(),
            total_cost,
            cost_by_service: self.cost_by_service.clone(),
            cost_by_category: self.cost_by_category.clone(),
            recommendations: deduplicate_recommendations(self.recommendations.clone()),
            metrics: self.metrics,
            total_batches: self.expected.len(),
            missing_batches: self.missing_batches(),
            generated_at: Utc::now(),
        }
    }

    /// Drain the result channel until every expected batch is merged, the
    /// channel closes, or the timeout elapses, then seal.
    ///
    /// This is the pipeline's only blocking point. Missing contributions are
    /// surfaced in `missing_batches`, never assumed zero.
    pub async fn collect(
        mut self,
        rx: &mut mpsc::Receiver<BatchResult>,
        timeout: Duration,
    ) -> Result<RunSummary, CostScopeError> {
        let deadline = tokio::time::Instant::now() + timeout;

        while !self.is_complete() {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(result)) => {
                    self.merge(result)?;
                }
                Ok(None) => {
                    warn!(
                        execution_id = %self.execution_id,
                        "Result channel closed before all batches arrived"
                    );
                    break;
                }
                Err(_) => {
                    warn!(
                        execution_id = %self.execution_id,
                        timeout_secs = timeout.as_secs(),
                        "Aggregation deadline elapsed"
                    );
                    break;
                }
            }
        }

        Ok(self.seal())
    }
}
