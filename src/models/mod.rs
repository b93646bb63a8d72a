pub mod probe;
pub mod batch;
pub mod recommendation;
pub mod summary;

pub use probe::{ProbeCategory, ProbeError, ProbeErrorKind, ProbeId, ProbeReport};
pub use batch::{Batch, BatchCosts, BatchResult, ExecutionPlan};
pub use recommendation::{deduplicate_recommendations, rank_recommendations, Priority, Recommendation};
pub use summary::{AccountRunSummary, CrossAccountSummary, RunMetrics, RunStatus, RunSummary};
