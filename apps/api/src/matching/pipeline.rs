//! Match pipeline orchestration.
//!
//! Flow: normalize profile → build queries → concurrent retrieval → clean →
//! score → rank → explain the shortlist → build MatchRun → store.
//!
//! Retrieval and explanation fan out concurrently; everything else is a pure,
//! synchronous transformation. A run is stored fully built or not at all.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MatcherConfig;
use crate::errors::AppError;
use crate::matching::cleaner::clean_listings;
use crate::matching::explain::templated_reasons;
use crate::matching::profile::normalize_profile;
use crate::matching::queries::build_queries;
use crate::matching::ranker::{diversify_top_k, rank_all};
use crate::matching::scorer::score_opportunity;
use crate::models::opportunity::{RawListing, ScoredOpportunity};
use crate::models::profile::{MatchRequest, Profile};
use crate::models::run::{MatchRun, QuerySpec};
use crate::state::AppState;

/// Runs the full matching pipeline for one request and stores the result.
///
/// Steps:
/// 1. normalize_profile() → Profile
/// 2. build_queries() → Vec<QuerySpec>
/// 3. retrieve_all() → Vec<RawListing> (concurrent, partial-failure tolerant)
/// 4. clean_listings() → Vec<Opportunity>
/// 5. score_opportunity() per opportunity
/// 6. rank_all() + diversify_top_k()
/// 7. attach_reasons() for the shortlist only
/// 8. build MatchRun, store under a fresh run_id
pub async fn run_match(state: &AppState, request: MatchRequest) -> Result<MatchRun, AppError> {
    let config = &state.config.matcher;

    // Step 1: normalize profile
    let profile = normalize_profile(&request, &state.tables)?;
    info!(
        "Profile normalized: track={}, year={:?}, {} scorable skills",
        profile.track,
        profile.year_level,
        profile.skills.scorable().count()
    );

    // Step 2: build queries
    let queries = build_queries(&profile, &state.tables, config.max_queries)?;
    info!("Built {} queries", queries.len());

    // Step 3: concurrent retrieval
    let raw = retrieve_all(state, &queries, config).await?;
    info!("Retrieved {} raw listings", raw.len());

    // Step 4: clean
    let now = Utc::now();
    let opportunities = clean_listings(raw, config.staleness_days, now);
    info!("Cleaned down to {} opportunities", opportunities.len());

    // Step 5: score
    let scored: Vec<ScoredOpportunity> = opportunities
        .iter()
        .map(|opportunity| score_opportunity(opportunity, &profile, &state.tables))
        .collect();

    // Step 6: rank
    let all_ranked = rank_all(&scored);
    let mut shortlist = diversify_top_k(&all_ranked, config.top_k);

    // Step 7: explanations, shortlist only, to bound external-call volume
    attach_reasons(state, &profile, &mut shortlist, config).await;

    // Step 8: build and store the run
    let run = MatchRun {
        run_id: Uuid::new_v4(),
        created_at: now,
        normalized_profile: profile,
        queries,
        opportunities: all_ranked
            .into_iter()
            .take(config.max_listed)
            .collect(),
        ranked: shortlist,
    };
    state.runs.put(run.clone()).await;
    info!(
        "Match run {} stored: {} listed, {} shortlisted",
        run.run_id,
        run.opportunities.len(),
        run.ranked.len()
    );

    Ok(run)
}

/// Dispatches every query concurrently (bounded) and merges results back in
/// (query index, per-query result index) order so downstream dedup is
/// reproducible regardless of completion order. Fails only when not a single
/// query succeeded.
async fn retrieve_all(
    state: &AppState,
    queries: &[QuerySpec],
    config: &MatcherConfig,
) -> Result<Vec<RawListing>, AppError> {
    let concurrency = config
        .retrieval_concurrency
        .unwrap_or(queries.len())
        .max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let max_age_days = config.staleness_days.map(|days| days.max(0) as u32);

    let mut tasks = JoinSet::new();
    for (index, spec) in queries.iter().enumerate() {
        let semaphore = semaphore.clone();
        let search = state.search.clone();
        let query = spec.query.clone();
        let cap = config.per_query_cap;
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (index, search.search(&query, cap, max_age_days).await)
        });
    }

    let deadline = Duration::from_secs(config.retrieval_timeout_secs);
    let started = Instant::now();
    let mut buffers: Vec<Option<Vec<RawListing>>> = vec![None; queries.len()];
    let mut succeeded = 0usize;

    loop {
        let remaining = match deadline.checked_sub(started.elapsed()) {
            Some(remaining) => remaining,
            None => {
                warn!(
                    "retrieval deadline reached with {succeeded}/{} queries done — \
                     continuing with partial results",
                    queries.len()
                );
                tasks.abort_all();
                break;
            }
        };
        let joined = match timeout(remaining, tasks.join_next()).await {
            Ok(Some(joined)) => joined,
            Ok(None) => break, // all tasks drained
            Err(_) => {
                warn!(
                    "retrieval deadline reached with {succeeded}/{} queries done — \
                     continuing with partial results",
                    queries.len()
                );
                tasks.abort_all();
                break;
            }
        };
        match joined {
            Ok((index, Ok(results))) => {
                succeeded += 1;
                buffers[index] = Some(results);
            }
            Ok((index, Err(e))) => {
                warn!("query {index} failed, continuing without it: {e}");
            }
            Err(e) => {
                warn!("retrieval task aborted: {e}");
            }
        }
    }

    if succeeded == 0 {
        return Err(AppError::Retrieval(format!(
            "all {} search queries failed",
            queries.len()
        )));
    }

    Ok(buffers.into_iter().flatten().flatten().collect())
}

/// Generates reasons for the shortlist, concurrently but bounded. Any failure
/// degrades to deterministic templated reasons; nothing here can fail a run.
async fn attach_reasons(
    state: &AppState,
    profile: &Profile,
    shortlist: &mut [ScoredOpportunity],
    config: &MatcherConfig,
) {
    if shortlist.is_empty() {
        return;
    }
    let concurrency = config.explain_concurrency.unwrap_or(shortlist.len()).max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let mut tasks = JoinSet::new();
    for (index, item) in shortlist.iter().enumerate() {
        let semaphore = semaphore.clone();
        let explainer = state.explainer.clone();
        let profile = profile.clone();
        let opportunity = item.opportunity.clone();
        let breakdown = item.breakdown.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let reasons = match explainer.reasons(&profile, &opportunity, &breakdown).await {
                Ok(reasons) => reasons,
                Err(e) => {
                    warn!(
                        "explanation failed for {} — using templated reasons: {e}",
                        opportunity.url
                    );
                    templated_reasons(&profile, &opportunity, &breakdown)
                }
            };
            (index, reasons)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Ok((index, reasons)) = joined {
            shortlist[index].reasons = reasons;
        }
    }

    // A panicked task leaves its slot empty; fill it from the template.
    for item in shortlist.iter_mut() {
        if item.reasons.is_empty() {
            item.reasons = templated_reasons(profile, &item.opportunity, &item.breakdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::matching::explain::{ExplainError, Explainer};
    use crate::matching::tables::MatchTables;
    use crate::models::opportunity::{Opportunity, ScoreBreakdown};
    use crate::models::profile::LocationPreference;
    use crate::search_client::{SearchError, SearchProvider};
    use crate::store::{InMemoryRunStore, RunStore};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubSearch {
        /// query substring → canned listings; anything else errors.
        canned: HashMap<&'static str, Vec<RawListing>>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(
            &self,
            query: &str,
            cap: usize,
            _max_age_days: Option<u32>,
        ) -> Result<Vec<RawListing>, SearchError> {
            for (needle, listings) in &self.canned {
                if query.contains(needle) {
                    return Ok(listings.iter().take(cap).cloned().collect());
                }
            }
            Err(SearchError::Api {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(
            &self,
            _query: &str,
            _cap: usize,
            _max_age_days: Option<u32>,
        ) -> Result<Vec<RawListing>, SearchError> {
            Err(SearchError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct FailingExplainer;

    #[async_trait]
    impl Explainer for FailingExplainer {
        async fn reasons(
            &self,
            _profile: &Profile,
            _opportunity: &Opportunity,
            _breakdown: &ScoreBreakdown,
        ) -> Result<Vec<String>, ExplainError> {
            Err(ExplainError::Empty)
        }
    }

    fn listing(title: &str, company: &str, url: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            company: company.to_string(),
            location: "Cairo, Egypt".to_string(),
            url: url.to_string(),
            source: "serpapi".to_string(),
            snippet: "python and sql internship work".to_string(),
            posted_at: None,
        }
    }

    fn test_state(search: Arc<dyn SearchProvider>) -> AppState {
        AppState {
            config: Config {
                search_api_key: String::new(),
                anthropic_api_key: String::new(),
                port: 0,
                rust_log: "info".to_string(),
                matcher: MatcherConfig::default(),
            },
            tables: Arc::new(MatchTables::builtin()),
            search,
            explainer: Arc::new(FailingExplainer),
            runs: Arc::new(InMemoryRunStore::default()),
        }
    }

    fn request() -> MatchRequest {
        MatchRequest {
            academic_year: 3,
            track: "data science".to_string(),
            location_preference: LocationPreference::Local,
            skills: vec!["python".to_string(), "sql".to_string(), "pandas".to_string()],
        }
    }

    #[tokio::test]
    async fn test_full_run_is_built_stored_and_explained() {
        let canned = HashMap::from([(
            "Data Science Intern",
            vec![
                listing("Data Science Intern", "Valeo", "https://a.com/jobs/ds-1"),
                listing("ML Intern", "Vodafone", "https://a.com/jobs/ml-2"),
                // Duplicate of the first URL, differing only in query string.
                listing("Data Science Intern", "Valeo", "https://a.com/jobs/ds-1?utm=x"),
                listing("Senior Data Scientist", "Valeo", "https://a.com/jobs/sr-3"),
            ],
        )]);
        let state = test_state(Arc::new(StubSearch { canned }));

        let run = run_match(&state, request()).await.unwrap();

        // Dedup + senior filter: 4 raw → 2 opportunities.
        assert_eq!(run.opportunities.len(), 2);
        assert!(run
            .opportunities
            .iter()
            .all(|o| o.opportunity.title != "Senior Data Scientist"));
        assert_eq!(run.queries.len(), 10);

        // Shortlist carries fallback reasons despite the failing explainer.
        assert!(!run.ranked.is_empty());
        assert!(run.ranked.iter().all(|s| !s.reasons.is_empty()));

        // Every breakdown sums to its score.
        for scored in run.opportunities.iter().chain(&run.ranked) {
            assert_eq!(scored.breakdown.values().sum::<u32>(), scored.score);
            assert!(scored.score <= 100);
        }

        // The run is retrievable from the store.
        let stored = state.runs.get(run.run_id).await.unwrap();
        assert_eq!(stored.run_id, run.run_id);
    }

    #[tokio::test]
    async fn test_all_queries_failing_is_a_retrieval_error_and_stores_nothing() {
        let store = Arc::new(InMemoryRunStore::default());
        let mut state = test_state(Arc::new(FailingSearch));
        state.runs = store.clone();

        let result = run_match(&state, request()).await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_partial_query_failure_still_produces_a_run() {
        // Only queries mentioning "Machine Learning Intern" succeed.
        let canned = HashMap::from([(
            "Machine Learning Intern",
            vec![listing("ML Intern", "IBM", "https://b.com/jobs/ml-1")],
        )]);
        let state = test_state(Arc::new(StubSearch { canned }));

        let run = run_match(&state, request()).await.unwrap();
        assert_eq!(run.opportunities.len(), 1);
        assert_eq!(run.opportunities[0].opportunity.company, "IBM");
    }

    #[tokio::test]
    async fn test_unknown_academic_year_fails_before_retrieval() {
        let state = test_state(Arc::new(FailingSearch));
        let mut bad = request();
        bad.academic_year = 0;
        let result = run_match(&state, bad).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_track_fails_before_retrieval() {
        let state = test_state(Arc::new(FailingSearch));
        let mut bad = request();
        bad.track = "astrology".to_string();
        let result = run_match(&state, bad).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_merge_order_is_deterministic_across_runs() {
        // Two queries succeed with listings that collide on URL; the
        // first query's record must win every time.
        let canned = HashMap::from([
            (
                "Data Science Intern",
                vec![listing("From Query A", "Valeo", "https://a.com/jobs/1")],
            ),
            (
                "Machine Learning Intern",
                vec![listing("From Query B", "Valeo", "https://a.com/jobs/1?src=b")],
            ),
        ]);
        let state = test_state(Arc::new(StubSearch { canned }));

        for _ in 0..5 {
            let run = run_match(&state, request()).await.unwrap();
            assert_eq!(run.opportunities.len(), 1);
            assert_eq!(run.opportunities[0].opportunity.title, "From Query A");
        }
    }
}
