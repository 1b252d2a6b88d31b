//! Match explanations — LLM-backed, with a deterministic templated fallback.
//!
//! The explainer is a capability interface so the pipeline can be exercised
//! fully offline with a stub. Explanation failures are never fatal: callers
//! fall back to `templated_reasons`.

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::prompts::{EXPLAIN_PROMPT_TEMPLATE, EXPLAIN_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::scorer;
use crate::models::opportunity::{Opportunity, ScoreBreakdown};
use crate::models::profile::{LocationPreference, Profile};

/// Hard cap on reasons per opportunity, whatever the model returns.
const MAX_REASONS: usize = 4;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("explanation payload was empty")]
    Empty,
}

/// Produces ordered, human-readable match reasons for one opportunity.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn reasons(
        &self,
        profile: &Profile,
        opportunity: &Opportunity,
        breakdown: &ScoreBreakdown,
    ) -> Result<Vec<String>, ExplainError>;
}

/// Default explainer backed by the Claude Messages API.
pub struct LlmExplainer {
    llm: LlmClient,
}

impl LlmExplainer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Explainer for LlmExplainer {
    async fn reasons(
        &self,
        profile: &Profile,
        opportunity: &Opportunity,
        breakdown: &ScoreBreakdown,
    ) -> Result<Vec<String>, ExplainError> {
        let prompt = EXPLAIN_PROMPT_TEMPLATE
            .replace("{profile_json}", &serde_json::to_string(profile)?)
            .replace("{opportunity_json}", &serde_json::to_string(opportunity)?)
            .replace("{breakdown_json}", &serde_json::to_string(breakdown)?);

        let reasons: Vec<String> = self.llm.call_json(&prompt, EXPLAIN_SYSTEM).await?;
        let reasons: Vec<String> = reasons
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .take(MAX_REASONS)
            .collect();

        if reasons.is_empty() {
            return Err(ExplainError::Empty);
        }
        Ok(reasons)
    }
}

/// Deterministic fallback built directly from the score breakdown, in rubric
/// order. Always returns at least one reason.
pub fn templated_reasons(
    profile: &Profile,
    opportunity: &Opportunity,
    breakdown: &ScoreBreakdown,
) -> Vec<String> {
    let points = |key: &str| breakdown.get(key).copied().unwrap_or(0);
    let mut reasons = Vec::new();

    let track_points = points(scorer::TRACK_ALIGNMENT);
    if track_points >= scorer::TRACK_FULL {
        reasons.push(format!("Matches your {} track", profile.track));
    } else if track_points >= scorer::TRACK_ADJACENT {
        reasons.push(format!("Closely related to your {} track", profile.track));
    }

    let matched_skills = points(scorer::SKILLS_MATCH) / scorer::SKILL_POINTS;
    if matched_skills > 0 {
        reasons.push(format!(
            "{matched_skills} of your skills appear in the posting"
        ));
    }

    let location_points = points(scorer::LOCATION_FIT);
    if location_points >= scorer::LOCATION_FULL {
        let preference = match profile.location_preference {
            LocationPreference::Local => "local",
            LocationPreference::Remote => "remote",
            LocationPreference::Abroad => "abroad",
        };
        reasons.push(format!("Location fits your {preference} preference"));
    } else if location_points >= scorer::LOCATION_REMOTE_PARTIAL {
        reasons.push("Remote-friendly, so location is flexible".to_string());
    }

    if points(scorer::READINESS) >= scorer::READINESS_FULL {
        reasons.push("An explicit internship role at your level".to_string());
    }

    if points(scorer::COMPANY_REPUTATION) >= scorer::REPUTATION_FULL {
        reasons.push(format!(
            "{} is a recognized tech employer",
            opportunity.company
        ));
    }

    if reasons.is_empty() {
        reasons.push("A potentially relevant internship opportunity".to_string());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::profile::normalize_profile;
    use crate::matching::scorer::score_opportunity;
    use crate::matching::tables::MatchTables;
    use crate::models::opportunity::Seniority;
    use crate::models::profile::MatchRequest;

    fn fixture() -> (Profile, Opportunity) {
        let tables = MatchTables::builtin();
        let profile = normalize_profile(
            &MatchRequest {
                academic_year: 3,
                track: "data science".to_string(),
                location_preference: LocationPreference::Local,
                skills: vec!["python".to_string(), "sql".to_string()],
            },
            &tables,
        )
        .unwrap();
        let opportunity = Opportunity {
            title: "Data Science Intern".to_string(),
            company: "Vodafone Egypt".to_string(),
            location: "Cairo, Egypt".to_string(),
            url: "https://jobs.example.com/ds-intern-1".to_string(),
            source: "serpapi".to_string(),
            description: "python and sql on real datasets".to_string(),
            is_internship: true,
            seniority_signal: Seniority::Intern,
        };
        (profile, opportunity)
    }

    #[test]
    fn test_templated_reasons_cover_strong_criteria_in_rubric_order() {
        let tables = MatchTables::builtin();
        let (profile, opportunity) = fixture();
        let scored = score_opportunity(&opportunity, &profile, &tables);
        let reasons = templated_reasons(&profile, &opportunity, &scored.breakdown);

        assert_eq!(reasons[0], "Matches your data science track");
        assert_eq!(reasons[1], "2 of your skills appear in the posting");
        assert_eq!(reasons[2], "Location fits your local preference");
        assert!(reasons.len() <= MAX_REASONS);
    }

    #[test]
    fn test_templated_reasons_are_deterministic() {
        let tables = MatchTables::builtin();
        let (profile, opportunity) = fixture();
        let scored = score_opportunity(&opportunity, &profile, &tables);
        let a = templated_reasons(&profile, &opportunity, &scored.breakdown);
        let b = templated_reasons(&profile, &opportunity, &scored.breakdown);
        assert_eq!(a, b);
    }

    #[test]
    fn test_templated_reasons_never_empty() {
        let (profile, opportunity) = fixture();
        let reasons = templated_reasons(&profile, &opportunity, &ScoreBreakdown::new());
        assert_eq!(
            reasons,
            vec!["A potentially relevant internship opportunity".to_string()]
        );
    }
}
