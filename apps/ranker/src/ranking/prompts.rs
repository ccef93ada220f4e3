// Prompt Builder for the ranking request. Pure string construction.

use crate::llm_client::prompts::RAW_JSON_INSTRUCTION;

/// Characters of the job description the model gets to see.
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 5000;
/// Characters of each résumé the model gets to see.
pub const MAX_CANDIDATE_CHARS: usize = 10000;

/// Ranking prompt template. Replace `{jd_text}`, `{candidates}` and
/// `{raw_json_instruction}` before sending.
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Act as a Senior Technical Recruiter and ATS System.

JOB DESCRIPTION:
{jd_text}

CANDIDATES:
{candidates}

TASK:
1. Analyze every candidate against the job description.
2. Rank them from #1 (best fit) to last. Every candidate gets exactly one rank.
3. Return the result strictly as a JSON list of objects, one object per candidate.

JSON FORMAT:
[
    {
        "rank": 1,
        "filename": "the filename shown in the CANDIDATE START marker",
        "candidate_name": "name extracted from the resume, or empty if unknown",
        "match_percentage": 85,
        "skills_match": ["Python", "SQL", "AWS"],
        "missing_skills": ["Docker", "Kubernetes"],
        "reason": "Strongest match because..."
    }
]

match_percentage is an integer from 0 to 100.

{raw_json_instruction}"#;

/// Builds the single ranking instruction from `(filename, text)` pairs.
///
/// Candidates appear in the order given. Deterministic for equal inputs.
pub fn build_ranking_prompt(candidates: &[(String, String)], job_description: &str) -> String {
    let candidates_text: String = candidates
        .iter()
        .map(|(filename, text)| candidate_block(filename, text))
        .collect();

    fill_template(
        RANKING_PROMPT_TEMPLATE,
        &[
            (
                "{jd_text}",
                truncate_chars(job_description, MAX_JOB_DESCRIPTION_CHARS),
            ),
            ("{candidates}", candidates_text.as_str()),
            ("{raw_json_instruction}", RAW_JSON_INSTRUCTION),
        ],
    )
}

/// Single-pass placeholder substitution; inserted values are never rescanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn candidate_block(filename: &str, text: &str) -> String {
    format!(
        "\n--- CANDIDATE START ({filename}) ---\n{}\n--- CANDIDATE END ---\n",
        truncate_chars(text, MAX_CANDIDATE_CHARS)
    )
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
