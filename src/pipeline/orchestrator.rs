use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::aggregator::ResultAggregator;
use super::mapper::BatchMapper;
use crate::catalog::ProbeCatalog;
use crate::config::PipelineSettings;
use crate::dispatch::{InProcessWorkerPool, ProbeRunner};
use crate::errors::{CostScopeError, RetryConfig};
use crate::models::{
    deduplicate_recommendations, AccountRunSummary, CrossAccountSummary, ProbeId, Recommendation,
    RunMetrics, RunStatus, RunSummary,
};

/// Runs the mapper -> dispatch -> aggregator pipeline once per AWS account
/// and merges per-account summaries into one cross-account summary.
///
/// Accounts are isolated: one account's failed or partial run never aborts
/// the others.
pub struct MultiAccountOrchestrator {
    settings: PipelineSettings,
    catalog: ProbeCatalog,
    runner: Arc<dyn ProbeRunner>,
    cancel_token: CancellationToken,
}

impl MultiAccountOrchestrator {
    pub fn new(
        settings: PipelineSettings,
        catalog: ProbeCatalog,
        runner: Arc<dyn ProbeRunner>,
    ) -> Self {
        Self {
            settings,
            catalog,
            runner,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Replace the orchestrator's cancel token with an external one so the
    /// caller can abandon all in-flight account runs.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub async fn run(&self, accounts: &[String]) -> Result<CrossAccountSummary, CostScopeError> {
        if accounts.is_empty() {
            return Err(CostScopeError::Config("no accounts to analyze".into()));
        }
        // Fatal configuration errors surface before any account work begins
        if self.settings.batch_size == 0 {
            return Err(CostScopeError::Config(
                "batch_size must be a positive integer".into(),
            ));
        }
        if self.catalog.is_empty() {
            return Err(CostScopeError::Config(
                "probe catalog is empty, nothing to plan".into(),
            ));
        }

        info!(
            accounts = accounts.len(),
            services = self.catalog.len(),
            batch_size = self.settings.batch_size,
            "Multi-account analysis started"
        );

        let handles: Vec<_> = accounts
            .iter()
            .map(|account_id| {
                let account = account_id.clone();
                let settings = self.settings.clone();
                let catalog = self.catalog.clone();
                let runner = Arc::clone(&self.runner);
                let cancel = self.cancel_token.clone();
                tokio::spawn(async move {
                    run_account_pipeline(account, settings, catalog, runner, cancel).await
                })
            })
            .collect();

        let mut summaries = Vec::with_capacity(accounts.len());
        for (account_id, joined) in accounts.iter().zip(join_all(handles).await) {
            match joined {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!(account = %account_id, error = %e, "Account pipeline task panicked");
                    summaries.push(failed_account_summary(account_id));
                }
            }
        }

        let cross = merge_account_summaries(summaries);
        info!(
            status = %cross.status,
            total_cost = cross.total_cost,
            accounts = cross.accounts_count,
            batches = cross.batches_count,
            "Multi-account analysis finished"
        );
        Ok(cross)
    }
}

async fn run_account_pipeline(
    account_id: String,
    settings: PipelineSettings,
    catalog: ProbeCatalog,
    runner: Arc<dyn ProbeRunner>,
    cancel: CancellationToken,
) -> AccountRunSummary {
    let plan = match BatchMapper::plan(&catalog, settings.batch_size) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(account = %account_id, error = %e, "Planning failed");
            return failed_account_summary(&account_id);
        }
    };

    let (tx, mut rx) = mpsc::channel(plan.total_batches.max(1));
    let pool = Arc::new(InProcessWorkerPool::new(runner).with_retry(RetryConfig {
        max_retries: settings.max_retries,
        dry_run: false,
    }));
    pool.dispatch(&account_id, &plan, tx);

    let aggregator = ResultAggregator::new(
        plan.execution_id.clone(),
        plan.batch_ids().into_iter().collect(),
    );

    let summary = tokio::select! {
        sealed = aggregator.collect(&mut rx, settings.timeout) => match sealed {
            Ok(summary) => summary,
            Err(e) => {
                // An integrity violation is a planning defect for this
                // account's run; other accounts proceed untouched
                error!(account = %account_id, error = %e, "Aggregation failed");
                return failed_account_summary(&account_id);
            }
        },
        _ = cancel.cancelled() => {
            info!(account = %account_id, "Run abandoned, discarding in-progress summary");
            return failed_account_summary(&account_id);
        }
    };

    info!(
        account = %account_id,
        status = %summary.status,
        total_cost = summary.total_cost,
        "Account analysis finished"
    );
    AccountRunSummary {
        account_id,
        summary,
    }
}

fn failed_account_summary(account_id: &str) -> AccountRunSummary {
    AccountRunSummary {
        account_id: account_id.to_string(),
        summary: RunSummary {
            execution_id: format!("aborted-{}", Uuid::new_v4()),
            status: RunStatus::Failed,
            total_cost: 0.0,
            cost_by_service: BTreeMap::new(),
            cost_by_category: BTreeMap::new(),
            recommendations: Vec::new(),
            metrics: RunMetrics::default(),
            total_batches: 0,
            missing_batches: Default::default(),
            generated_at: Utc::now(),
        },
    }
}

/// Merge account summaries using the same additive rules as batch
/// aggregation. Unlike within one execution plan, the same probe id in two
/// accounts is expected, so service costs sum.
fn merge_account_summaries(accounts: Vec<AccountRunSummary>) -> CrossAccountSummary {
    let mut total_cost = 0.0;
    let mut cost_by_service: BTreeMap<ProbeId, f64> = BTreeMap::new();
    let mut cost_by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut recommendations: Vec<Recommendation> = Vec::new();
    let mut metrics = RunMetrics::default();
    let mut batches_count = 0;
    let mut all_success = true;

    for account in &accounts {
        let summary = &account.summary;
        if summary.status != RunStatus::Success {
            all_success = false;
        }
        total_cost += summary.total_cost;
        for (probe_id, cost) in &summary.cost_by_service {
            *cost_by_service.entry(probe_id.clone()).or_insert(0.0) += cost;
        }
        for (category, cost) in &summary.cost_by_category {
            *cost_by_category.entry(category.clone()).or_insert(0.0) += cost;
        }
        recommendations.extend(summary.recommendations.iter().cloned());
        metrics.merge(&summary.metrics);
        batches_count += summary.total_batches;
    }

    CrossAccountSummary {
        status: if all_success {
            RunStatus::Success
        } else {
            RunStatus::Partial
        },
        total_cost,
        cost_by_service,
        cost_by_category,
        recommendations: deduplicate_recommendations(recommendations),
        metrics,
        accounts_count: accounts.len(),
        batches_count,
        accounts,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::{ProbeCategory, ProbeReport};

    /// Succeeds everywhere except the accounts listed as failing, where
    /// every probe errors.
    struct PerAccountRunner {
        failing_accounts: Vec<String>,
    }

    #[async_trait]
    impl ProbeRunner for PerAccountRunner {
        async fn run_probe(
            &self,
            account_id: &str,
            probe_id: &ProbeId,
        ) -> Result<ProbeReport, CostScopeError> {
            if self.failing_accounts.iter().any(|a| a == account_id) {
                return Err(CostScopeError::Probe("simulated outage".into()));
            }
            Ok(ProbeReport {
                probe_id: probe_id.clone(),
                category: ProbeCategory::Compute,
                monthly_cost: 10.0,
                resources_analyzed: 2,
                anomalies_detected: 0,
                optimizations_found: 0,
                recommendations: Vec::new(),
            })
        }
    }

    fn catalog(n: usize) -> ProbeCatalog {
        (0..n).map(|i| ProbeId::new(format!("svc-{i}"))).collect()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            batch_size: 2,
            timeout: std::time::Duration::from_secs(5),
            max_retries: 0,
            ..Default::default()
        }
    }

    fn orchestrator(failing_accounts: &[&str]) -> MultiAccountOrchestrator {
        MultiAccountOrchestrator::new(
            settings(),
            catalog(6),
            Arc::new(PerAccountRunner {
                failing_accounts: failing_accounts.iter().map(|s| s.to_string()).collect(),
            }),
        )
    }

    #[tokio::test]
    async fn test_all_accounts_succeed() {
        let accounts = vec!["111111111111".to_string(), "222222222222".to_string()];
        let cross = orchestrator(&[]).run(&accounts).await.unwrap();

        assert_eq!(cross.status, RunStatus::Success);
        assert_eq!(cross.accounts_count, 2);
        assert_eq!(cross.batches_count, 6);
        // 6 services x $10 x 2 accounts
        assert!((cross.total_cost - 120.0).abs() < 1e-9);
        // Same probe in both accounts sums additively
        assert!((cross.cost_by_service[&ProbeId::new("svc-0")] - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_probe_outage_is_soft_not_failed() {
        // Every probe errors in the failing account, but each batch still
        // returns a (cost-free) result, so the account run is Success with
        // soft failures recorded
        let accounts = vec!["111111111111".to_string(), "333333333333".to_string()];
        let cross = orchestrator(&["333333333333"]).run(&accounts).await.unwrap();

        assert_eq!(cross.accounts_count, 2);
        let failed = cross
            .accounts
            .iter()
            .find(|a| a.account_id == "333333333333")
            .unwrap();
        assert_eq!(failed.summary.metrics.soft_failures, 6);
        assert_eq!(failed.summary.total_cost, 0.0);
        assert!((cross.total_cost - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_accounts_is_config_error() {
        let err = orchestrator(&[]).run(&[]).await.unwrap_err();
        assert!(matches!(err, CostScopeError::Config(_)));
    }

    #[tokio::test]
    async fn test_cancel_discards_in_progress_runs() {
        let orch = orchestrator(&[]);
        orch.cancel();
        let accounts = vec!["111111111111".to_string()];
        let cross = orch.run(&accounts).await.unwrap();
        // Abandoned run yields a failed account entry rather than an abort
        assert_eq!(cross.status, RunStatus::Partial);
        assert_eq!(cross.accounts[0].summary.status, RunStatus::Failed);
    }

    #[test]
    fn test_merge_marks_partial_when_any_account_failed() {
        let good = AccountRunSummary {
            account_id: "1".to_string(),
            summary: RunSummary {
                execution_id: "run-a".to_string(),
                status: RunStatus::Success,
                total_cost: 100.0,
                cost_by_service: [(ProbeId::new("ec2"), 100.0)].into_iter().collect(),
                cost_by_category: [("compute".to_string(), 100.0)].into_iter().collect(),
                recommendations: Vec::new(),
                metrics: RunMetrics::default(),
                total_batches: 3,
                missing_batches: Default::default(),
                generated_at: Utc::now(),
            },
        };
        let bad = failed_account_summary("2");

        let cross = merge_account_summaries(vec![good, bad]);
        assert_eq!(cross.status, RunStatus::Partial);
        assert_eq!(cross.accounts_count, 2);
        assert_eq!(cross.batches_count, 3);
        assert_eq!(cross.total_cost, 100.0);
    }
}
