pub mod snapshot;

pub use snapshot::{CostSnapshot, ServiceSnapshot, SnapshotProbeRunner};

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::{with_retry, CostScopeError, RetryConfig};
use crate::models::{Batch, BatchResult, ExecutionPlan, ProbeErrorKind, ProbeId, ProbeReport};

/// Executes one probe identifier against one account.
///
/// The ~250 per-service implementations live behind this seam; the pipeline
/// treats them as opaque functions returning a structured report or error.
#[async_trait]
pub trait ProbeRunner: Send + Sync {
    async fn run_probe(
        &self,
        account_id: &str,
        probe_id: &ProbeId,
    ) -> Result<ProbeReport, CostScopeError>;
}

/// Worker tier contract: one batch in, exactly one batch result out.
///
/// A worker that never responds is detected by the aggregator via its
/// timeout, not here.
#[async_trait]
pub trait BatchWorker: Send + Sync {
    async fn execute(&self, account_id: &str, batch: &Batch) -> BatchResult;
}

/// Worker pool running batches as concurrent tokio tasks in-process.
///
/// Workers share no mutable state; results reach the aggregator over an
/// mpsc channel with at-least-once semantics.
pub struct InProcessWorkerPool {
    runner: Arc<dyn ProbeRunner>,
    retry: RetryConfig,
}

impl InProcessWorkerPool {
    pub fn new(runner: Arc<dyn ProbeRunner>) -> Self {
        Self {
            runner,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Spawn one task per batch in the plan, delivering each result to `tx`.
    /// Returns immediately; the aggregator drains the channel.
    pub fn dispatch(
        self: Arc<Self>,
        account_id: &str,
        plan: &ExecutionPlan,
        tx: mpsc::Sender<BatchResult>,
    ) {
        for batch in plan.batches.clone() {
            let pool = Arc::clone(&self);
            let account = account_id.to_string();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = pool.execute(&account, &batch).await;
                if tx.send(result).await.is_err() {
                    warn!(
                        batch_id = %batch.batch_id,
                        "Aggregator gone before batch result delivery"
                    );
                }
            });
        }
    }
}

#[async_trait]
impl BatchWorker for InProcessWorkerPool {
    async fn execute(&self, account_id: &str, batch: &Batch) -> BatchResult {
        debug!(
            batch_id = %batch.batch_id,
            probes = batch.probe_ids.len(),
            account_id,
            "Executing batch"
        );

        let outcomes = join_all(batch.probe_ids.iter().map(|probe_id| {
            let runner = Arc::clone(&self.runner);
            let retry = &self.retry;
            async move {
                let outcome = with_retry(probe_id.as_str(), retry, || {
                    let runner = Arc::clone(&runner);
                    let account = account_id.to_string();
                    let probe_id = probe_id.clone();
                    async move { runner.run_probe(&account, &probe_id).await }
                })
                .await;
                (probe_id.clone(), outcome)
            }
        }))
        .await;

        let mut result = BatchResult::new(batch.batch_id.clone());
        for (probe_id, outcome) in outcomes {
            match outcome {
                Ok(report) => result.record_report(report),
                Err(e) => {
                    warn!(probe = %probe_id, error = %e, "Probe failed");
                    result.record_failure(probe_id, error_kind(&e), e.to_string());
                }
            }
        }
        result
    }
}

fn error_kind(error: &CostScopeError) -> ProbeErrorKind {
    match error {
        CostScopeError::Timeout(_) => ProbeErrorKind::Timeout,
        CostScopeError::Probe(msg) if msg.contains("denied") => ProbeErrorKind::AccessDenied,
        CostScopeError::Probe(msg) if msg.contains("throttl") => ProbeErrorKind::Throttled,
        CostScopeError::Probe(_) => ProbeErrorKind::ApiFailure,
        _ => ProbeErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeCategory;
    use std::collections::BTreeSet;

    struct FlakyRunner {
        failing: BTreeSet<String>,
    }

    #[async_trait]
    impl ProbeRunner for FlakyRunner {
        async fn run_probe(
            &self,
            _account_id: &str,
            probe_id: &ProbeId,
        ) -> Result<ProbeReport, CostScopeError> {
            if self.failing.contains(probe_id.as_str()) {
                return Err(CostScopeError::Probe("access denied by service".into()));
            }
            Ok(ProbeReport {
                probe_id: probe_id.clone(),
                category: ProbeCategory::Compute,
                monthly_cost: 10.0,
                resources_analyzed: 3,
                anomalies_detected: 0,
                optimizations_found: 1,
                recommendations: Vec::new(),
            })
        }
    }

    fn pool(failing: &[&str]) -> Arc<InProcessWorkerPool> {
        let runner = Arc::new(FlakyRunner {
            failing: failing.iter().map(|s| s.to_string()).collect(),
        });
        // Dry-run retry config keeps tests fast: no backoff sleeps
        Arc::new(
            InProcessWorkerPool::new(runner).with_retry(RetryConfig {
                max_retries: 0,
                dry_run: true,
            }),
        )
    }

    fn batch(ids: &[&str]) -> Batch {
        Batch {
            batch_id: "run-b0".to_string(),
            probe_ids: ids.iter().map(|s| ProbeId::new(*s)).collect(),
        }
    }

    #[tokio::test]
    async fn test_execute_reports_all_probes() {
        let result = pool(&[]).execute("111111111111", &batch(&["ec2", "rds"])).await;
        assert_eq!(result.batch_id, "run-b0");
        assert_eq!(result.services.len(), 2);
        assert!(result.services.values().all(|ok| *ok));
        assert_eq!(result.costs.by_service.len(), 2);
        assert_eq!(result.metrics.resources_analyzed, 6);
    }

    #[tokio::test]
    async fn test_failed_probe_is_soft_failure() {
        let result = pool(&["rds"]).execute("111111111111", &batch(&["ec2", "rds"])).await;
        assert_eq!(result.services[&ProbeId::new("ec2")], true);
        assert_eq!(result.services[&ProbeId::new("rds")], false);
        assert_eq!(result.metrics.soft_failures, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ProbeErrorKind::AccessDenied);
        // Failed probe contributes no cost entry
        assert!(!result.costs.by_service.contains_key(&ProbeId::new("rds")));
    }

    #[tokio::test]
    async fn test_dispatch_delivers_one_result_per_batch() {
        use crate::catalog::ProbeCatalog;
        use crate::pipeline::mapper::BatchMapper;

        let catalog: ProbeCatalog = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(ProbeId::from)
            .collect();
        let plan = BatchMapper::plan(&catalog, 2).unwrap();
        let (tx, mut rx) = mpsc::channel(8);

        pool(&[]).dispatch("111111111111", &plan, tx);

        let mut seen = BTreeSet::new();
        for _ in 0..plan.total_batches {
            let result = rx.recv().await.expect("missing batch result");
            seen.insert(result.batch_id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            error_kind(&CostScopeError::Timeout("slow".into())),
            ProbeErrorKind::Timeout
        );
        assert_eq!(
            error_kind(&CostScopeError::Probe("request throttled".into())),
            ProbeErrorKind::Throttled
        );
        assert_eq!(
            error_kind(&CostScopeError::Probe("bad response".into())),
            ProbeErrorKind::ApiFailure
        );
    }
}
