//! Search provider boundary — the job-search API is an unreliable external
//! collaborator. Per-query failures surface as `SearchError` and never abort
//! a whole match run; the pipeline decides what to do with partial results.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::opportunity::RawListing;

const SEARCH_API_URL: &str = "https://serpapi.com/search.json";
const MAX_RETRIES: u32 = 3;

/// Source label stamped on every listing this client returns.
pub const SOURCE_LABEL: &str = "serpapi";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("exhausted {retries} retries")]
    RetriesExhausted { retries: u32 },
}

/// Executes a single search query against the job-search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns at most `cap` raw listings for `query`. `max_age_days` asks
    /// the backend to pre-filter by posting recency where supported.
    async fn search(
        &self,
        query: &str,
        cap: usize,
        max_age_days: Option<u32>,
    ) -> Result<Vec<RawListing>, SearchError>;
}

/// SerpApi Google Jobs client.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(
        &self,
        query: &str,
        cap: usize,
        max_age_days: Option<u32>,
    ) -> Result<Vec<RawListing>, SearchError> {
        let mut last_error: Option<SearchError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "search attempt {attempt} for '{query}' failed, retrying after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.get(SEARCH_API_URL).query(&[
                ("engine", "google_jobs"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ]);
            if let Some(days) = max_age_days {
                request = request.query(&[("chips", date_posted_chip(days))]);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SearchError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                last_error = Some(SearchError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(SearchError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let payload: JobsPayload = response.json().await?;
            let listings: Vec<RawListing> = payload
                .jobs_results
                .into_iter()
                .take(cap)
                .map(JobResult::into_raw_listing)
                .collect();
            debug!("query '{query}' returned {} listings", listings.len());
            return Ok(listings);
        }

        Err(last_error.unwrap_or(SearchError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

/// Maps a freshness window to the closest `date_posted` chip the backend
/// understands.
fn date_posted_chip(max_age_days: u32) -> &'static str {
    match max_age_days {
        0..=1 => "date_posted:today",
        2..=3 => "date_posted:3days",
        4..=7 => "date_posted:week",
        _ => "date_posted:month",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire payload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct JobsPayload {
    #[serde(default)]
    jobs_results: Vec<JobResult>,
}

#[derive(Debug, Deserialize)]
struct JobResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    location: String,
    share_link: Option<String>,
    link: Option<String>,
    #[serde(default)]
    description: String,
    detected_extensions: Option<DetectedExtensions>,
}

#[derive(Debug, Deserialize)]
struct DetectedExtensions {
    posted_at: Option<String>,
}

impl JobResult {
    fn into_raw_listing(self) -> RawListing {
        let posted_at = self
            .detected_extensions
            .as_ref()
            .and_then(|ext| ext.posted_at.as_deref())
            .and_then(parse_posted_age)
            .map(|age| Utc::now() - age);
        RawListing {
            title: self.title,
            company: self.company_name,
            location: self.location,
            url: self.share_link.or(self.link).unwrap_or_default(),
            source: SOURCE_LABEL.to_string(),
            snippet: self.description,
            posted_at,
        }
    }
}

/// Parses relative recency strings like "3 days ago" or "just posted" into
/// an age. Returns `None` when the signal is undetectable.
fn parse_posted_age(text: &str) -> Option<Duration> {
    let text = text.trim().to_lowercase();
    if text == "today" || text == "just posted" {
        return Some(Duration::zero());
    }
    if text == "yesterday" {
        return Some(Duration::days(1));
    }

    let mut parts = text.split_whitespace();
    let amount: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    match parts.next() {
        Some("ago") => {}
        _ => return None,
    }
    match unit.trim_end_matches('s') {
        "minute" => Some(Duration::minutes(amount)),
        "hour" => Some(Duration::hours(amount)),
        "day" => Some(Duration::days(amount)),
        "week" => Some(Duration::weeks(amount)),
        "month" => Some(Duration::days(amount * 30)),
        _ => None,
    }
}
