//! Query construction — expands a normalized profile into a bounded set of
//! independently executable search queries.

use crate::errors::AppError;
use crate::matching::tables::MatchTables;
use crate::models::profile::{LocationPreference, Profile};
use crate::models::run::QuerySpec;

/// Modifiers appended on repeat passes so repeated titles still produce
/// distinct queries that pull different results.
const QUERY_MODIFIERS: &[&str] = &["2024", "2025", "remote", "summer", "paid", "student"];

/// Builds exactly `max_queries` distinct queries for the profile's track.
/// Unknown tracks are a configuration error — this is where track validation
/// happens.
pub fn build_queries(
    profile: &Profile,
    tables: &MatchTables,
    max_queries: usize,
) -> Result<Vec<QuerySpec>, AppError> {
    let titles = tables.track_titles.get(&profile.track).ok_or_else(|| {
        AppError::Configuration(format!("track '{}' is not configured", profile.track))
    })?;

    let location_term = location_term(profile.location_preference);
    let mut queries = Vec::with_capacity(max_queries);

    'outer: for pass in 0.. {
        let modifier = match pass {
            0 => None,
            n => match QUERY_MODIFIERS.get(n - 1) {
                Some(m) => Some(*m),
                // Modifier list exhausted: stop rather than emit duplicates.
                None => break,
            },
        };
        for title in titles {
            if queries.len() == max_queries {
                break 'outer;
            }
            let mut query = format!("{title} internship {location_term}");
            if let Some(modifier) = modifier {
                query.push(' ');
                query.push_str(modifier);
            }
            let rationale = match modifier {
                None => format!("{title} roles for the {} track", profile.track),
                Some(modifier) => format!(
                    "{title} roles for the {} track, '{modifier}' variant",
                    profile.track
                ),
            };
            queries.push(QuerySpec { query, rationale });
        }
    }

    Ok(queries)
}

fn location_term(preference: LocationPreference) -> &'static str {
    match preference {
        LocationPreference::Local => "Egypt",
        LocationPreference::Remote => "remote",
        LocationPreference::Abroad => "international",
    }
}
