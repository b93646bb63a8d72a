use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProbeRunner;
use crate::catalog::category_for;
use crate::errors::CostScopeError;
use crate::models::{ProbeId, ProbeReport, Recommendation};

/// One service's observed state inside a cost snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub monthly_cost: f64,
    #[serde(default)]
    pub resources_analyzed: u64,
    #[serde(default)]
    pub anomalies_detected: u64,
    #[serde(default)]
    pub optimizations_found: u64,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Point-in-time cost observations keyed by account id, then probe id.
///
/// Backs a `ProbeRunner` so the full pipeline can run end-to-end from a
/// JSON file, without live AWS credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSnapshot {
    pub accounts: BTreeMap<String, BTreeMap<String, ServiceSnapshot>>,
}

impl CostSnapshot {
    pub async fn from_file(path: &Path) -> Result<Self, CostScopeError> {
        if !path.exists() {
            return Err(CostScopeError::InvalidInput(format!(
                "snapshot file not found: {}",
                path.display()
            )));
        }
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: CostSnapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    pub fn account_ids(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }
}

/// Probe runner answering from a cost snapshot.
pub struct SnapshotProbeRunner {
    snapshot: CostSnapshot,
}

impl SnapshotProbeRunner {
    pub fn new(snapshot: CostSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl ProbeRunner for SnapshotProbeRunner {
    async fn run_probe(
        &self,
        account_id: &str,
        probe_id: &ProbeId,
    ) -> Result<ProbeReport, CostScopeError> {
        let services = self.snapshot.accounts.get(account_id).ok_or_else(|| {
            CostScopeError::Probe(format!("no snapshot data for account '{account_id}'"))
        })?;
        let entry = services.get(probe_id.as_str()).ok_or_else(|| {
            CostScopeError::Probe(format!(
                "no snapshot data for service '{probe_id}' in account '{account_id}'"
            ))
        })?;

        Ok(ProbeReport {
            probe_id: probe_id.clone(),
            category: category_for(probe_id),
            monthly_cost: entry.monthly_cost,
            resources_analyzed: entry.resources_analyzed,
            anomalies_detected: entry.anomalies_detected,
            optimizations_found: entry.optimizations_found,
            recommendations: entry.recommendations.clone(),
        })
    }
}
