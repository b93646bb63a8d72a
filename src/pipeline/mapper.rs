use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::catalog::ProbeCatalog;
use crate::errors::CostScopeError;
use crate::models::{Batch, ExecutionPlan};

/// Partitions a probe catalog into fixed-size batches.
///
/// Partitioning is deterministic for a given (catalog, batch_size): batches
/// are filled in catalog order, each of size `batch_size` except possibly the
/// last. Only the `execution_id` differs between two plans of the same
/// inputs, so reprocessing reproduces identical batch membership.
pub struct BatchMapper;

impl BatchMapper {
    pub fn plan(catalog: &ProbeCatalog, batch_size: usize) -> Result<ExecutionPlan, CostScopeError> {
        if batch_size == 0 {
            return Err(CostScopeError::Config(
                "batch_size must be a positive integer".into(),
            ));
        }
        if catalog.is_empty() {
            return Err(CostScopeError::Config(
                "probe catalog is empty, nothing to plan".into(),
            ));
        }

        let execution_id = format!("run-{}", Uuid::new_v4());
        let batches: Vec<Batch> = catalog
            .probe_ids()
            .chunks(batch_size)
            .enumerate()
            .map(|(idx, chunk)| Batch {
                batch_id: format!("{}-b{}", execution_id, idx),
                probe_ids: chunk.to_vec(),
            })
            .collect();

        let plan = ExecutionPlan {
            total_services: catalog.len(),
            total_batches: batches.len(),
            execution_id,
            batches,
            created_at: Utc::now(),
        };

        info!(
            execution_id = %plan.execution_id,
            total_services = plan.total_services,
            total_batches = plan.total_batches,
            batch_size,
            "Execution plan created"
        );

        Ok(plan)
    }
}
