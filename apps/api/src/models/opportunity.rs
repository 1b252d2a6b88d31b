use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw record from the search provider. Not deduplicated; may be a
/// search-result page or otherwise off-topic — the cleaner assumes nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub source: String,
    pub snippet: String,
    /// Absolute posting time, when the provider exposed a recency signal.
    pub posted_at: Option<DateTime<Utc>>,
}

/// Seniority inferred from listing title keywords. `Senior` listings are
/// discarded by the cleaner; `Unknown` is kept and scored conservatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Intern,
    Junior,
    Senior,
    Unknown,
}

/// Canonical post-clean opportunity. `url` is normalized (no query string,
/// no trailing slash) and unique across a cleaned set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub source: String,
    pub description: String,
    pub is_internship: bool,
    pub seniority_signal: Seniority,
}

/// Points awarded per scoring criterion. A BTreeMap keeps iteration and
/// serialization order stable, so breakdowns compare bit-for-bit.
pub type ScoreBreakdown = BTreeMap<String, u32>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredOpportunity {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    /// Empty until explanation generation runs for the ranked shortlist.
    pub reasons: Vec<String>,
}
