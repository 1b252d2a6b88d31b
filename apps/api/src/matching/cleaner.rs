//! Retrieval-result cleaning — page-type and recency filtering, seniority
//! classification, and URL-keyed deduplication.
//!
//! Input order matters: listings arrive already merged by (query index,
//! per-query result index), so "first-seen wins" below is reproducible
//! regardless of how the concurrent retrieval calls interleaved.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::models::opportunity::{Opportunity, RawListing, Seniority};

const SENIOR_MARKERS: &[&str] = &[
    "senior", "sr", "staff", "principal", "lead", "manager", "director", "head",
];
const INTERN_MARKERS: &[&str] = &["intern", "interns", "internship", "internships", "trainee", "co-op", "coop"];
const JUNIOR_MARKERS: &[&str] = &["junior", "entry", "graduate", "fresher"];

/// Path roots that denote listing/category pages rather than a single job.
const CATEGORY_ROOTS: &[&str] = &["jobs", "job", "careers", "internships", "vacancies", "search"];

/// Cleans raw listings into canonical opportunities. `now` is passed in so
/// the recency filter stays a pure function of its inputs.
pub fn clean_listings(
    raw: Vec<RawListing>,
    staleness_days: Option<i64>,
    now: DateTime<Utc>,
) -> Vec<Opportunity> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut cleaned = Vec::new();

    for listing in raw {
        let url = normalize_url(&listing.url);
        if url.is_empty() || !is_job_page(&url) {
            continue;
        }

        if let Some(max_days) = staleness_days {
            // A listing only passes when it carries a recency signal that is
            // inside the freshness window; no signal means no pass.
            let fresh = listing
                .posted_at
                .is_some_and(|posted| now.signed_duration_since(posted) <= Duration::days(max_days));
            if !fresh {
                continue;
            }
        }

        let seniority = classify_seniority(&listing.title);
        if seniority == Seniority::Senior {
            continue;
        }

        // First-seen wins on URL collision; query order is the tie-break.
        if !seen.insert(url.clone()) {
            continue;
        }

        cleaned.push(Opportunity {
            title: listing.title.trim().to_string(),
            company: listing.company.trim().to_string(),
            location: listing.location.trim().to_string(),
            url,
            source: listing.source,
            description: listing.snippet,
            is_internship: seniority == Seniority::Intern,
            seniority_signal: seniority,
        });
    }

    cleaned
}

/// Dedup key: lowercase, drop fragment and query string, trim trailing
/// slashes.
pub fn normalize_url(url: &str) -> String {
    let mut url = url.trim().to_lowercase();
    if let Some(pos) = url.find('#') {
        url.truncate(pos);
    }
    if let Some(pos) = url.find('?') {
        url.truncate(pos);
    }
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Keeps only URLs that look like an individual job page: a real path below
/// the host, not a bare search/category root.
pub fn is_job_page(normalized_url: &str) -> bool {
    let rest = match normalized_url.split_once("://") {
        Some((_, rest)) => rest,
        None => normalized_url,
    };
    let mut segments = rest.split('/');
    let _host = segments.next();
    let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        // Bare host — a landing page, not a posting.
        [] => false,
        // A single category root ("/jobs", "/search") with nothing deeper.
        [only] => !CATEGORY_ROOTS.contains(only),
        // Any "search" segment marks a result page.
        _ => !segments.iter().any(|s| *s == "search"),
    }
}

/// Classifies a seniority signal from title tokens. Senior markers win so the
/// intern-only invariant is enforced even for titles like
/// "Senior Data Scientist (ex-intern welcome)".
pub fn classify_seniority(title: &str) -> Seniority {
    let lower = title.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .filter(|t| !t.is_empty())
        .collect();

    let has = |markers: &[&str]| tokens.iter().any(|t| markers.contains(t));

    if has(SENIOR_MARKERS) {
        Seniority::Senior
    } else if has(INTERN_MARKERS) {
        Seniority::Intern
    } else if has(JUNIOR_MARKERS) {
        Seniority::Junior
    } else {
        Seniority::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(title: &str, url: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Cairo, Egypt".to_string(),
            url: url.to_string(),
            source: "serpapi".to_string(),
            snippet: "An internship.".to_string(),
            posted_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_url_with_casing_and_query_string_dedups_to_one() {
        let raw = vec![
            listing("Data Intern", "https://example.com/jobs/data-intern-1?ref=a"),
            listing("Data Intern", "https://Example.com/jobs/Data-Intern-1/"),
        ];
        let cleaned = clean_listings(raw, None, now());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].url, "https://example.com/jobs/data-intern-1");
    }

    #[test]
    fn test_url_uniqueness_holds_across_the_cleaned_set() {
        let raw = vec![
            listing("Intern A", "https://a.com/jobs/1"),
            listing("Intern B", "https://b.com/jobs/2"),
            listing("Intern A again", "https://a.com/jobs/1?utm=x"),
            listing("Intern C", "https://c.com/jobs/3"),
        ];
        let cleaned = clean_listings(raw, None, now());
        let urls: HashSet<&str> = cleaned.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(urls.len(), cleaned.len());
    }

    #[test]
    fn test_first_seen_record_wins_on_collision() {
        let mut second = listing("Second Title", "https://a.com/jobs/1?page=2");
        second.company = "Other".to_string();
        let raw = vec![listing("First Title", "https://a.com/jobs/1"), second];
        let cleaned = clean_listings(raw, None, now());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].title, "First Title");
        assert_eq!(cleaned[0].company, "Acme");
    }

    #[test]
    fn test_senior_titles_are_excluded_entirely() {
        let raw = vec![
            listing("Senior Data Scientist", "https://a.com/jobs/1"),
            listing("Engineering Manager", "https://a.com/jobs/2"),
            listing("Data Science Intern", "https://a.com/jobs/3"),
        ];
        let cleaned = clean_listings(raw, None, now());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].title, "Data Science Intern");
    }

    #[test]
    fn test_unclear_titles_are_kept_as_unknown() {
        let raw = vec![listing("Data Scientist", "https://a.com/jobs/1")];
        let cleaned = clean_listings(raw, None, now());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].seniority_signal, Seniority::Unknown);
        assert!(!cleaned[0].is_internship);
    }

    #[test]
    fn test_category_and_search_pages_are_dropped() {
        assert!(!is_job_page("https://example.com"));
        assert!(!is_job_page("https://example.com/jobs"));
        assert!(!is_job_page("https://example.com/search"));
        assert!(!is_job_page("https://example.com/jobs/search/data"));
        assert!(is_job_page("https://example.com/jobs/data-intern-123"));
        assert!(is_job_page("https://example.com/careers/eng/intern-2024"));
    }

    #[test]
    fn test_recency_filter_drops_stale_and_unsigned_listings() {
        let mut fresh = listing("Intern A", "https://a.com/jobs/1");
        fresh.posted_at = Some(now() - Duration::days(3));
        let mut stale = listing("Intern B", "https://a.com/jobs/2");
        stale.posted_at = Some(now() - Duration::days(45));
        let unsigned = listing("Intern C", "https://a.com/jobs/3");

        let cleaned = clean_listings(vec![fresh, stale, unsigned], Some(30), now());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].url, "https://a.com/jobs/1");
    }

    #[test]
    fn test_no_threshold_passes_everything_through() {
        let unsigned = listing("Intern C", "https://a.com/jobs/3");
        let cleaned = clean_listings(vec![unsigned], None, now());
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_output_preserves_insertion_order() {
        let raw = vec![
            listing("Intern B", "https://b.com/jobs/2"),
            listing("Intern A", "https://a.com/jobs/1"),
            listing("Intern C", "https://c.com/jobs/3"),
        ];
        let cleaned = clean_listings(raw, None, now());
        let titles: Vec<&str> = cleaned.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Intern B", "Intern A", "Intern C"]);
    }

    #[test]
    fn test_classify_seniority_markers() {
        assert_eq!(classify_seniority("Software Intern"), Seniority::Intern);
        assert_eq!(classify_seniority("ML Trainee Program"), Seniority::Intern);
        assert_eq!(classify_seniority("Junior Developer"), Seniority::Junior);
        assert_eq!(classify_seniority("Entry Level Analyst"), Seniority::Junior);
        assert_eq!(classify_seniority("Staff Engineer"), Seniority::Senior);
        assert_eq!(classify_seniority("Head of Data"), Seniority::Senior);
        assert_eq!(classify_seniority("Data Scientist"), Seniority::Unknown);
    }

    #[test]
    fn test_intern_marker_does_not_fire_on_international() {
        // Token-based matching: "international" is not an intern marker.
        assert_eq!(
            classify_seniority("International Payments Analyst"),
            Seniority::Unknown
        );
    }
}
