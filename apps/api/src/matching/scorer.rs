//! Multi-criteria opportunity scoring.
//!
//! Seven additive criteria summing to at most 100. Pure and deterministic:
//! the same (opportunity, profile, tables) triple always produces the same
//! score and breakdown, and the breakdown always sums to the score.

use crate::matching::tables::MatchTables;
use crate::models::opportunity::{Opportunity, ScoreBreakdown, ScoredOpportunity, Seniority};
use crate::models::profile::{LocationPreference, Profile};

pub const TRACK_ALIGNMENT: &str = "track_alignment";
pub const SKILLS_MATCH: &str = "skills_match";
pub const ACADEMIC_FIT: &str = "academic_fit";
pub const LOCATION_FIT: &str = "location_fit";
pub const READINESS: &str = "readiness";
pub const PLATFORM_QUALITY: &str = "platform_quality";
pub const COMPANY_REPUTATION: &str = "company_reputation";

pub(crate) const TRACK_FULL: u32 = 25;
pub(crate) const TRACK_ADJACENT: u32 = TRACK_FULL / 2;
pub(crate) const SKILL_POINTS: u32 = 10;
pub(crate) const SKILLS_CAP: u32 = 30;
const ACADEMIC_FULL: u32 = 10;
const ACADEMIC_NO_SIGNAL: u32 = 7;
const ACADEMIC_CONFLICT: u32 = 5;
pub(crate) const LOCATION_FULL: u32 = 15;
pub(crate) const LOCATION_REMOTE_PARTIAL: u32 = 8;
pub(crate) const READINESS_FULL: u32 = 10;
const READINESS_PARTIAL: u32 = 5;
pub(crate) const REPUTATION_FULL: u32 = 5;

/// Phrases that encode an explicit year requirement, mapped to the minimum
/// year rank they demand.
const YEAR_REQUIREMENTS: &[(&str, u8)] = &[
    ("first year", 1),
    ("1st year", 1),
    ("second year", 2),
    ("2nd year", 2),
    ("third year", 3),
    ("3rd year", 3),
    ("penultimate year", 3),
    ("fourth year", 4),
    ("4th year", 4),
    ("final year", 4),
    ("graduates only", 5),
    ("graduate students", 5),
];

/// Scores one opportunity against the profile. Reasons stay empty here —
/// explanation generation runs later, only for the ranked shortlist.
pub fn score_opportunity(
    opportunity: &Opportunity,
    profile: &Profile,
    tables: &MatchTables,
) -> ScoredOpportunity {
    let text = format!("{} {}", opportunity.title, opportunity.description).to_lowercase();

    let mut breakdown = ScoreBreakdown::new();
    breakdown.insert(
        TRACK_ALIGNMENT.to_string(),
        track_alignment(&text, &profile.track, tables),
    );
    breakdown.insert(SKILLS_MATCH.to_string(), skills_match(&text, profile));
    breakdown.insert(
        ACADEMIC_FIT.to_string(),
        academic_fit(&text, opportunity.seniority_signal, profile),
    );
    breakdown.insert(
        LOCATION_FIT.to_string(),
        location_fit(opportunity, profile.location_preference, tables),
    );
    breakdown.insert(
        READINESS.to_string(),
        readiness(opportunity.seniority_signal),
    );
    breakdown.insert(
        PLATFORM_QUALITY.to_string(),
        platform_quality(&opportunity.source, tables),
    );
    breakdown.insert(
        COMPANY_REPUTATION.to_string(),
        company_reputation(&opportunity.company, tables),
    );

    let score = breakdown.values().sum::<u32>().min(100);

    ScoredOpportunity {
        opportunity: opportunity.clone(),
        score,
        breakdown,
        reasons: Vec::new(),
    }
}

/// Full credit when the listing mentions the profile's track (by name or any
/// of its role titles); half for an adjacent track; zero otherwise.
fn track_alignment(text: &str, track: &str, tables: &MatchTables) -> u32 {
    if track_mentioned(text, track, tables) {
        return TRACK_FULL;
    }
    let adjacent = tables
        .track_adjacency
        .get(track)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if adjacent
        .iter()
        .any(|other| track_mentioned(text, other, tables))
    {
        return TRACK_ADJACENT;
    }
    0
}

fn track_mentioned(text: &str, track: &str, tables: &MatchTables) -> bool {
    if text.contains(track) {
        return true;
    }
    tables
        .track_titles
        .get(track)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .any(|title| text.contains(&title.to_lowercase()))
}

/// A fixed per-skill award, capped. Only classified skills count —
/// unclassified strings carry no scoring signal.
fn skills_match(text: &str, profile: &Profile) -> u32 {
    let matched = profile
        .skills
        .scorable()
        .filter(|skill| text.contains(skill))
        .count() as u32;
    (matched * SKILL_POINTS).min(SKILLS_CAP)
}

fn academic_fit(text: &str, seniority: Seniority, profile: &Profile) -> u32 {
    let required_rank = YEAR_REQUIREMENTS
        .iter()
        .filter(|(phrase, _)| text.contains(phrase))
        .map(|(_, rank)| *rank)
        .max();

    match required_rank {
        Some(rank) if rank > profile.year_level.rank() => ACADEMIC_CONFLICT,
        _ if seniority == Seniority::Intern => ACADEMIC_FULL,
        _ => ACADEMIC_NO_SIGNAL,
    }
}

fn location_fit(
    opportunity: &Opportunity,
    preference: LocationPreference,
    tables: &MatchTables,
) -> u32 {
    match detect_location(opportunity, tables) {
        Some(category) if category == preference => LOCATION_FULL,
        // A remote listing partially satisfies any preference.
        Some(LocationPreference::Remote) => LOCATION_REMOTE_PARTIAL,
        _ => 0,
    }
}

/// Remote markers beat local markers; any other non-empty location reads as
/// abroad; an empty location is undetectable and earns nothing.
fn detect_location(
    opportunity: &Opportunity,
    tables: &MatchTables,
) -> Option<LocationPreference> {
    let location = opportunity.location.to_lowercase();
    let description = opportunity.description.to_lowercase();
    if location.contains("remote")
        || description.contains("fully remote")
        || description.contains("work from home")
    {
        return Some(LocationPreference::Remote);
    }
    if tables
        .local_markers
        .iter()
        .any(|marker| location.contains(marker))
    {
        return Some(LocationPreference::Local);
    }
    if !location.is_empty() {
        return Some(LocationPreference::Abroad);
    }
    None
}

fn readiness(seniority: Seniority) -> u32 {
    match seniority {
        Seniority::Intern => READINESS_FULL,
        Seniority::Junior | Seniority::Unknown => READINESS_PARTIAL,
        // Filtered upstream; a senior listing that slips through earns nothing.
        Seniority::Senior => 0,
    }
}

fn platform_quality(source: &str, tables: &MatchTables) -> u32 {
    tables
        .source_quality
        .get(&source.to_lowercase())
        .copied()
        .unwrap_or(tables.default_source_quality)
}

fn company_reputation(company: &str, tables: &MatchTables) -> u32 {
    let company = company.to_lowercase();
    if tables
        .known_companies
        .iter()
        .any(|known| company.contains(known))
    {
        REPUTATION_FULL
    } else {
        0
    }
}
