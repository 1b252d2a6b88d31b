use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::opportunity::ScoredOpportunity;
use crate::models::profile::Profile;

/// One generated search query with a human-readable rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    pub query: String,
    pub rationale: String,
}

/// One complete execution of the matching pipeline. Write-once: built fully,
/// stored under `run_id`, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRun {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub normalized_profile: Profile,
    pub queries: Vec<QuerySpec>,
    /// Full scored list, score-descending, truncated to the configured cap.
    pub opportunities: Vec<ScoredOpportunity>,
    /// Diversified top-K shortlist with explanations attached.
    pub ranked: Vec<ScoredOpportunity>,
}
