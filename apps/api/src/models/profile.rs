use serde::{Deserialize, Serialize};

/// Raw match request as submitted by the client. Skills are free text and
/// not yet categorized; `track` is validated later by the query builder.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub academic_year: i32,
    pub track: String,
    #[serde(default)]
    pub location_preference: LocationPreference,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Where the student wants to work. `egypt` is accepted as a legacy wire
/// alias for `local`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPreference {
    #[default]
    #[serde(alias = "egypt")]
    Local,
    Remote,
    Abroad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearLevel {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Graduate,
}

impl YearLevel {
    /// Numeric rank used when comparing against year requirements detected in
    /// listing text (freshman=1 .. graduate=5).
    pub fn rank(self) -> u8 {
        match self {
            YearLevel::Freshman => 1,
            YearLevel::Sophomore => 2,
            YearLevel::Junior => 3,
            YearLevel::Senior => 4,
            YearLevel::Graduate => 5,
        }
    }
}

/// Categorized skills. `hard`/`tools`/`soft` hold normalized strings and feed
/// the scorer; `unclassified` preserves submitted strings that matched no
/// reference set, for audit only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillBuckets {
    pub hard: Vec<String>,
    pub tools: Vec<String>,
    pub soft: Vec<String>,
    pub unclassified: Vec<String>,
}

impl SkillBuckets {
    /// All skills that contribute scoring signal (hard ∪ tools ∪ soft).
    pub fn scorable(&self) -> impl Iterator<Item = &str> {
        self.hard
            .iter()
            .chain(self.tools.iter())
            .chain(self.soft.iter())
            .map(String::as_str)
    }
}

/// Normalized student profile. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub year_level: YearLevel,
    pub track: String,
    pub location_preference: LocationPreference,
    pub skills: SkillBuckets,
    /// Skills exactly as submitted, before normalization.
    pub raw_skills: Vec<String>,
}
