//! Prompt constants for explanation generation.

/// System prompt enforcing JSON-only output for explanation calls.
pub const EXPLAIN_SYSTEM: &str = "You are a concise career advisor for university students. \
    You MUST respond with a valid JSON array of strings only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Prompt template for generating match reasons. Placeholders:
/// `{profile_json}`, `{opportunity_json}`, `{breakdown_json}`.
pub const EXPLAIN_PROMPT_TEMPLATE: &str = r#"A student was matched to an internship posting by a deterministic scoring pipeline.

Student profile:
{profile_json}

Internship posting:
{opportunity_json}

Points awarded per scoring criterion (criterion -> points):
{breakdown_json}

Write 2 to 4 short reasons (one sentence each, no bullets, no numbering) explaining why this posting fits the student. Base every reason strictly on the profile, the posting, and the awarded points. Do not invent details that are not present. Order the reasons from strongest to weakest signal.

Return a JSON array of strings."#;
