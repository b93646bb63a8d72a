use std::collections::HashMap;
use std::collections::hash_map::Entry;
use serde::{Deserialize, Serialize};

/// Priority of a cost optimization recommendation, ordered from most to
/// least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Returns a numeric rank where lower values indicate higher priority.
    /// Critical = 0, High = 1, Medium = 2, Low = 3.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// A single cost optimization recommendation produced by a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Resource type the recommendation applies to (e.g. "ec2-instance").
    pub resource_type: String,
    /// Identifier of the concrete resource.
    pub resource_id: String,
    /// The recommended action.
    pub recommendation: String,
    pub priority: Priority,
    pub estimated_monthly_savings: f64,
}

impl Recommendation {
    /// Identity under deduplication.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.resource_type.clone(),
            self.resource_id.clone(),
            self.recommendation.clone(),
        )
    }
}

/// Deduplicate recommendations by (resource_type, resource_id, recommendation),
/// keeping the highest-priority entry on conflict.
pub fn deduplicate_recommendations(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen: HashMap<(String, String, String), Recommendation> = HashMap::new();
    for rec in recommendations {
        match seen.entry(rec.dedup_key()) {
            Entry::Vacant(e) => { e.insert(rec); }
            Entry::Occupied(mut e) => {
                // Keep higher priority (lower rank number)
                if rec.priority.rank() < e.get().priority.rank() {
                    e.insert(rec);
                }
            }
        }
    }
    let mut deduped: Vec<Recommendation> = seen.into_values().collect();
    rank_recommendations(&mut deduped);
    deduped
}

/// Sort by priority rank, then estimated savings (largest first), then
/// dedup key so ordering is deterministic across merges.
pub fn rank_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        a.priority.rank()
            .cmp(&b.priority.rank())
            .then_with(|| {
                b.estimated_monthly_savings
                    .partial_cmp(&a.estimated_monthly_savings)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.dedup_key().cmp(&b.dedup_key()))
    });
}
