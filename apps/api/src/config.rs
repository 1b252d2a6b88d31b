use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub search_api_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub matcher: MatcherConfig,
}

/// Tuning knobs for the matching pipeline. All have code defaults so tests
/// can use `MatcherConfig::default()` directly.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Number of search queries generated per run.
    pub max_queries: usize,
    /// Max raw listings accepted per query.
    pub per_query_cap: usize,
    /// Size of the diversified shortlist.
    pub top_k: usize,
    /// Cap on the full scored list embedded in a run.
    pub max_listed: usize,
    /// Freshness window in days; unset disables the recency filter.
    pub staleness_days: Option<i64>,
    /// Concurrent retrieval calls; unset means one task per query.
    pub retrieval_concurrency: Option<usize>,
    /// Overall deadline for the retrieval stage.
    pub retrieval_timeout_secs: u64,
    /// Concurrent explanation calls; unset means one task per shortlist slot.
    pub explain_concurrency: Option<usize>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_queries: 10,
            per_query_cap: 8,
            top_k: 5,
            max_listed: 20,
            staleness_days: None,
            retrieval_concurrency: None,
            retrieval_timeout_secs: 20,
            explain_concurrency: None,
        }
    }
}

impl MatcherConfig {
    fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_queries: optional_env("MAX_QUERIES")?.unwrap_or(defaults.max_queries),
            per_query_cap: optional_env("PER_QUERY_CAP")?.unwrap_or(defaults.per_query_cap),
            top_k: optional_env("TOP_K")?.unwrap_or(defaults.top_k),
            max_listed: optional_env("MAX_LISTED")?.unwrap_or(defaults.max_listed),
            staleness_days: optional_env("STALENESS_DAYS")?,
            retrieval_concurrency: optional_env("RETRIEVAL_CONCURRENCY")?,
            retrieval_timeout_secs: optional_env("RETRIEVAL_TIMEOUT_SECS")?
                .unwrap_or(defaults.retrieval_timeout_secs),
            explain_concurrency: optional_env("EXPLAIN_CONCURRENCY")?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            search_api_key: require_env("SEARCH_API_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT")?.unwrap_or(8080),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            matcher: MatcherConfig::from_env()?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => {
            let parsed = value
                .parse::<T>()
                .with_context(|| format!("Environment variable '{key}' is not a valid value"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_defaults_match_product_settings() {
        let config = MatcherConfig::default();
        assert_eq!(config.max_queries, 10);
        assert_eq!(config.per_query_cap, 8);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_listed, 20);
        assert!(config.staleness_days.is_none());
    }
}
