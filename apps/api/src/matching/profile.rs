//! Profile normalization — year-level mapping and skill categorization.
//!
//! Pure and deterministic: the same request always yields the same profile.
//! Track validation intentionally does NOT happen here — the query builder
//! owns the track table and rejects unknown tracks.

use std::collections::HashSet;

use crate::errors::AppError;
use crate::matching::tables::MatchTables;
use crate::models::profile::{MatchRequest, Profile, SkillBuckets, YearLevel};

/// Normalizes a raw match request into an immutable profile.
pub fn normalize_profile(
    request: &MatchRequest,
    tables: &MatchTables,
) -> Result<Profile, AppError> {
    let year_level = year_level_for(request.academic_year)?;

    let mut buckets = SkillBuckets::default();
    for raw in &request.skills {
        let skill = raw.trim().to_lowercase();
        if skill.is_empty() {
            continue;
        }
        // Precedence: tools > hard > soft. A skill lands in exactly one
        // bucket so it is never double-counted by the scorer.
        if matches_reference(&skill, &tables.tool_skills) {
            push_unique(&mut buckets.tools, skill);
        } else if matches_reference(&skill, &tables.hard_skills) {
            push_unique(&mut buckets.hard, skill);
        } else if matches_reference(&skill, &tables.soft_skills) {
            push_unique(&mut buckets.soft, skill);
        } else {
            // Kept for audit with the original submitted casing.
            push_unique(&mut buckets.unclassified, raw.trim().to_string());
        }
    }
    buckets.hard.sort();
    buckets.tools.sort();
    buckets.soft.sort();

    Ok(Profile {
        year_level,
        track: request.track.trim().to_lowercase(),
        location_preference: request.location_preference,
        skills: buckets,
        raw_skills: request.skills.clone(),
    })
}

fn year_level_for(academic_year: i32) -> Result<YearLevel, AppError> {
    match academic_year {
        i if i < 1 => Err(AppError::Validation(format!(
            "academic_year must be at least 1, got {i}"
        ))),
        1 => Ok(YearLevel::Freshman),
        2 => Ok(YearLevel::Sophomore),
        3 => Ok(YearLevel::Junior),
        4 => Ok(YearLevel::Senior),
        _ => Ok(YearLevel::Graduate),
    }
}

/// Exact membership, or a reference term appearing inside the submitted
/// skill ("python 3" still counts as "python").
fn matches_reference(skill: &str, reference: &HashSet<String>) -> bool {
    reference.contains(skill) || reference.iter().any(|term| skill.contains(term.as_str()))
}

fn push_unique(bucket: &mut Vec<String>, skill: String) {
    if !bucket.contains(&skill) {
        bucket.push(skill);
    }
}
