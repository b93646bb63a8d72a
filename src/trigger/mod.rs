//! Transport-agnostic entry points for external dispatch layers.
//!
//! One invocation maps a catalog into batches; repeated aggregation
//! invocations fold delivered batch results into the same run summary
//! until the run completes or its deadline passes.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::ProbeCatalog;
use crate::config::PipelineSettings;
use crate::errors::CostScopeError;
use crate::models::{Batch, BatchResult, ProbeId, RunStatus, RunSummary};
use crate::pipeline::{BatchMapper, ResultAggregator};

/// Mapping invocation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRequest {
    /// Who triggered the run (scheduler, api, cli).
    pub source: String,
    pub analysis_type: String,
    #[serde(default)]
    pub input: MapInput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapInput {
    /// Explicit service subset; empty means the full standard catalog.
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapResponse {
    pub execution_id: String,
    pub batches: Vec<Batch>,
    pub total_services: usize,
    pub total_batches: usize,
}

/// Aggregation invocation payload. `start_time` is the dispatcher's run
/// start; once the configured timeout has elapsed past it, the run seals
/// with whatever arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub execution_id: String,
    pub batch_results: Vec<BatchResult>,
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub status: RunStatus,
    pub summary: RunSummary,
}

/// Holds one live aggregator per in-flight execution id.
pub struct TriggerService {
    settings: PipelineSettings,
    live: DashMap<String, ResultAggregator>,
}

impl TriggerService {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            live: DashMap::new(),
        }
    }

    /// Number of in-flight runs.
    pub fn live_runs(&self) -> usize {
        self.live.len()
    }

    pub fn map(&self, request: &MapRequest) -> Result<MapResponse, CostScopeError> {
        let catalog = if request.input.services.is_empty() {
            ProbeCatalog::standard()
        } else {
            request
                .input
                .services
                .iter()
                .map(|s| ProbeId::new(s.clone()))
                .collect()
        };

        let plan = BatchMapper::plan(&catalog, self.settings.batch_size)?;
        self.live.insert(
            plan.execution_id.clone(),
            ResultAggregator::new(
                plan.execution_id.clone(),
                plan.batch_ids().into_iter().collect(),
            ),
        );

        info!(
            source = %request.source,
            analysis_type = %request.analysis_type,
            execution_id = %plan.execution_id,
            total_batches = plan.total_batches,
            "Mapping invocation"
        );

        Ok(MapResponse {
            execution_id: plan.execution_id,
            total_services: plan.total_services,
            total_batches: plan.total_batches,
            batches: plan.batches,
        })
    }

    pub fn aggregate(
        &self,
        request: AggregateRequest,
    ) -> Result<AggregateResponse, CostScopeError> {
        let mut entry = self.live.get_mut(&request.execution_id).ok_or_else(|| {
            CostScopeError::InvalidInput(format!(
                "unknown or already sealed execution id '{}'",
                request.execution_id
            ))
        })?;

        for result in request.batch_results {
            entry.merge(result)?;
        }

        let deadline_passed = match request.start_time {
            Some(start) => {
                let limit = chrono::Duration::from_std(self.settings.timeout)
                    .unwrap_or(chrono::Duration::MAX);
                Utc::now().signed_duration_since(start) > limit
            }
            None => false,
        };

        if entry.is_complete() || deadline_passed {
            drop(entry);
            let Some((_, aggregator)) = self.live.remove(&request.execution_id) else {
                return Err(CostScopeError::Internal(format!(
                    "execution '{}' sealed concurrently",
                    request.execution_id
                )));
            };
            let summary = aggregator.seal();
            return Ok(AggregateResponse {
                status: summary.status,
                summary,
            });
        }

        let summary = entry.snapshot();
        Ok(AggregateResponse {
            status: summary.status,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchCosts, RunMetrics};
    use std::collections::BTreeMap;

    fn service() -> TriggerService {
        TriggerService::new(PipelineSettings {
            batch_size: 2,
            ..Default::default()
        })
    }

    fn map_request(services: &[&str]) -> MapRequest {
        MapRequest {
            source: "scheduler".to_string(),
            analysis_type: "cost".to_string(),
            input: MapInput {
                services: services.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn result_for(batch: &Batch) -> BatchResult {
        let mut by_service = BTreeMap::new();
        let mut services = BTreeMap::new();
        for probe_id in &batch.probe_ids {
            by_service.insert(probe_id.clone(), 10.0);
            services.insert(probe_id.clone(), true);
        }
        BatchResult {
            batch_id: batch.batch_id.clone(),
            services,
            costs: BatchCosts {
                by_service,
                by_category: BTreeMap::new(),
            },
            recommendations: Vec::new(),
            metrics: RunMetrics::default(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_map_partitions_requested_services() {
        let svc = service();
        let response = svc.map(&map_request(&["ec2", "rds", "s3"])).unwrap();
        assert_eq!(response.total_services, 3);
        assert_eq!(response.total_batches, 2);
        assert_eq!(svc.live_runs(), 1);
    }

    #[test]
    fn test_map_defaults_to_standard_catalog() {
        let svc = service();
        let response = svc.map(&map_request(&[])).unwrap();
        assert_eq!(
            response.total_services,
            crate::catalog::SERVICE_REGISTRY.len()
        );
    }

    #[test]
    fn test_aggregate_round_trip() {
        let svc = service();
        let mapped = svc.map(&map_request(&["ec2", "rds", "s3"])).unwrap();

        // First delivery: one of two batches
        let first = svc
            .aggregate(AggregateRequest {
                execution_id: mapped.execution_id.clone(),
                batch_results: vec![result_for(&mapped.batches[0])],
                start_time: Some(Utc::now()),
            })
            .unwrap();
        assert_eq!(first.status, RunStatus::Partial);

        // Second delivery completes and seals the run
        let second = svc
            .aggregate(AggregateRequest {
                execution_id: mapped.execution_id.clone(),
                batch_results: vec![result_for(&mapped.batches[1])],
                start_time: Some(Utc::now()),
            })
            .unwrap();
        assert_eq!(second.status, RunStatus::Success);
        assert!((second.summary.total_cost - 30.0).abs() < 1e-9);
        assert_eq!(svc.live_runs(), 0);

        // A sealed run no longer accepts deliveries
        let err = svc
            .aggregate(AggregateRequest {
                execution_id: mapped.execution_id,
                batch_results: Vec::new(),
                start_time: None,
            })
            .unwrap_err();
        assert!(matches!(err, CostScopeError::InvalidInput(_)));
    }

    #[test]
    fn test_aggregate_redelivery_is_noop() {
        let svc = service();
        let mapped = svc.map(&map_request(&["ec2", "rds", "s3"])).unwrap();

        for _ in 0..2 {
            let response = svc
                .aggregate(AggregateRequest {
                    execution_id: mapped.execution_id.clone(),
                    batch_results: vec![result_for(&mapped.batches[0])],
                    start_time: Some(Utc::now()),
                })
                .unwrap();
            assert!((response.summary.total_cost - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_aggregate_seals_partial_after_deadline() {
        let svc = service();
        let mapped = svc.map(&map_request(&["ec2", "rds", "s3"])).unwrap();

        let stale_start = Utc::now() - chrono::Duration::hours(2);
        let response = svc
            .aggregate(AggregateRequest {
                execution_id: mapped.execution_id.clone(),
                batch_results: vec![result_for(&mapped.batches[0])],
                start_time: Some(stale_start),
            })
            .unwrap();
        assert_eq!(response.status, RunStatus::Partial);
        assert_eq!(response.summary.missing_batches.len(), 1);
        assert_eq!(svc.live_runs(), 0);
    }

    #[test]
    fn test_unknown_execution_id_rejected() {
        let err = service()
            .aggregate(AggregateRequest {
                execution_id: "run-missing".to_string(),
                batch_results: Vec::new(),
                start_time: None,
            })
            .unwrap_err();
        assert!(matches!(err, CostScopeError::InvalidInput(_)));
    }
}
