//! Run store — keyed storage for completed match runs.
//!
//! Runs are write-once, read-many: a `MatchRun` is stored fully built or not
//! at all, so readers never observe partial state. The backing implementation
//! is injectable; the default is an in-process map that empties on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::run::MatchRun;

#[async_trait]
pub trait RunStore: Send + Sync {
    async fn put(&self, run: MatchRun);
    async fn get(&self, run_id: Uuid) -> Option<MatchRun>;
}

/// Default process-wide store. Each request writes under a fresh `run_id`,
/// so writers never contend on the same key.
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<Uuid, MatchRun>>,
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn put(&self, run: MatchRun) {
        self.runs.write().await.insert(run.run_id, run);
    }

    async fn get(&self, run_id: Uuid) -> Option<MatchRun> {
        self.runs.read().await.get(&run_id).cloned()
    }
}
