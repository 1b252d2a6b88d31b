//! Ranking — stable score ordering plus company-diversified shortlisting.

use std::collections::HashMap;

use crate::models::opportunity::ScoredOpportunity;

/// Max entries per company in the shortlist before diversification skips.
const COMPANY_CAP: usize = 2;

/// Full view: score-descending, ties keeping cleaner insertion order
/// (`sort_by` is stable).
pub fn rank_all(scored: &[ScoredOpportunity]) -> Vec<ScoredOpportunity> {
    let mut sorted = scored.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted
}

/// Diversified top-K over an already score-sorted slice: greedy by score,
/// skipping a candidate once its company holds two slots. Skipped candidates
/// are revisited in score order if that is the only way to reach
/// min(K, available) — the shortlist is never artificially short.
pub fn diversify_top_k(sorted: &[ScoredOpportunity], k: usize) -> Vec<ScoredOpportunity> {
    let mut selected: Vec<ScoredOpportunity> = Vec::with_capacity(k.min(sorted.len()));
    let mut skipped: Vec<&ScoredOpportunity> = Vec::new();
    let mut per_company: HashMap<String, usize> = HashMap::new();

    for candidate in sorted {
        if selected.len() == k {
            break;
        }
        let company = candidate.opportunity.company.to_lowercase();
        let count = per_company.entry(company).or_insert(0);
        if *count >= COMPANY_CAP {
            skipped.push(candidate);
            continue;
        }
        *count += 1;
        selected.push(candidate.clone());
    }

    for candidate in skipped {
        if selected.len() == k {
            break;
        }
        selected.push(candidate.clone());
    }

    selected
}
