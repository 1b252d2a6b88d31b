use std::sync::Arc;

use crate::config::Config;
use crate::matching::explain::Explainer;
use crate::matching::tables::MatchTables;
use crate::search_client::SearchProvider;
use crate::store::RunStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Collaborators sit behind trait objects so tests can swap in
/// deterministic stubs.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Fixed reference tables, loaded once at startup.
    pub tables: Arc<MatchTables>,
    pub search: Arc<dyn SearchProvider>,
    pub explainer: Arc<dyn Explainer>,
    pub runs: Arc<dyn RunStore>,
}
