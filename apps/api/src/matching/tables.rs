//! Fixed reference data backing the matching pipeline.
//!
//! Built once at startup and injected everywhere that needs it, so tests can
//! substitute smaller tables without touching the pipeline.

use std::collections::{HashMap, HashSet};

/// Immutable lookup tables: track titles, track adjacency, skill reference
/// sets, location markers, known employers, and per-source quality points.
#[derive(Debug)]
pub struct MatchTables {
    /// track → role-title alternatives, used for query building and
    /// track-alignment scoring.
    pub track_titles: HashMap<String, Vec<String>>,
    /// track → adjacent tracks that earn partial alignment credit.
    pub track_adjacency: HashMap<String, Vec<String>>,
    pub hard_skills: HashSet<String>,
    pub tool_skills: HashSet<String>,
    pub soft_skills: HashSet<String>,
    /// Lowercased substrings that mark an opportunity location as local.
    pub local_markers: Vec<String>,
    /// Lowercased employer names awarded reputation points on containment.
    pub known_companies: HashSet<String>,
    /// source label → platform-quality points.
    pub source_quality: HashMap<String, u32>,
    pub default_source_quality: u32,
}

fn string_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn title_table(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(track, titles)| {
            (
                track.to_string(),
                titles.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

impl MatchTables {
    /// The built-in production tables.
    pub fn builtin() -> Self {
        let track_titles = title_table(&[
            (
                "computer science",
                &["Software Engineer Intern", "Data Science Intern", "ML Intern"],
            ),
            (
                "data science",
                &[
                    "Data Science Intern",
                    "Machine Learning Intern",
                    "Data Analyst Intern",
                ],
            ),
            ("ai engineer", &["AI Intern", "Machine Learning Intern"]),
            ("data engineer", &["Data Engineering Intern", "ETL Intern"]),
            ("backend", &["Backend Intern", "Software Engineer Intern"]),
            (
                "software engineering",
                &[
                    "Software Engineer Intern",
                    "Full Stack Intern",
                    "Backend Intern",
                ],
            ),
            (
                "cybersecurity",
                &["Cybersecurity Intern", "Security Analyst Intern"],
            ),
            ("business", &["Business Analyst Intern", "Product Intern"]),
        ]);

        let track_adjacency = title_table(&[
            (
                "computer science",
                &["software engineering", "data science", "backend"],
            ),
            (
                "data science",
                &["ai engineer", "data engineer", "computer science"],
            ),
            ("ai engineer", &["data science", "computer science"]),
            ("data engineer", &["data science", "backend"]),
            ("backend", &["software engineering", "computer science"]),
            (
                "software engineering",
                &["computer science", "backend"],
            ),
            ("cybersecurity", &["computer science"]),
            ("business", &[]),
        ]);

        Self {
            track_titles,
            track_adjacency,
            hard_skills: string_set(&[
                "machine learning",
                "deep learning",
                "data analysis",
                "statistics",
                "algorithms",
                "nlp",
                "computer vision",
                "web development",
                "backend development",
                "data engineering",
                "databases",
                "networking",
                "security",
            ]),
            tool_skills: string_set(&[
                "python",
                "sql",
                "pandas",
                "numpy",
                "tensorflow",
                "pytorch",
                "docker",
                "kubernetes",
                "aws",
                "git",
                "excel",
                "tableau",
                "power bi",
                "linux",
                "react",
                "postgresql",
                "mongodb",
            ]),
            soft_skills: string_set(&[
                "communication",
                "teamwork",
                "leadership",
                "collaboration",
                "problem solving",
                "presentation",
                "time management",
            ]),
            local_markers: vec![
                "egypt".to_string(),
                "cairo".to_string(),
                "alexandria".to_string(),
                "giza".to_string(),
            ],
            known_companies: string_set(&[
                "google",
                "microsoft",
                "amazon",
                "meta",
                "apple",
                "ibm",
                "intel",
                "nvidia",
                "oracle",
                "dell",
                "cisco",
                "siemens",
                "valeo",
                "vodafone",
                "orange",
                "instabug",
                "swvl",
                "fawry",
                "paymob",
            ]),
            source_quality: [("serpapi".to_string(), 5)].into_iter().collect(),
            default_source_quality: 3,
        }
    }
}

impl Default for MatchTables {
    fn default() -> Self {
        Self::builtin()
    }
}
