use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::extraction::SkippedDocument;

/// Filename the legacy tool used to smuggle failures through the result list.
pub const ERROR_SENTINEL_FILENAME: &str = "Error";

/// One candidate's scoring record as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub filename: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub candidate_name: String,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub match_percentage: i64,
    #[serde(default)]
    pub skills_match: SkillList,
    #[serde(default)]
    pub missing_skills: SkillList,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub reason: String,
}

/// Free-text skill list. Models answer with either a JSON array or a single
/// comma-separated string; both land here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SkillList(pub Vec<String>);

impl SkillList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn display(&self) -> String {
        self.0.join(", ")
    }
}

impl<'de> Deserialize<'de> for SkillList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Text(String),
            Missing(Option<()>),
        }

        let items = match Raw::deserialize(deserializer)? {
            Raw::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Raw::Text(text) => text
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Raw::Missing(_) => Vec::new(),
        };
        Ok(SkillList(items))
    }
}

/// Free text where the model may answer `null` instead of leaving the key out.
fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| D::Error::custom("match_percentage is not a finite number")),
        other => Err(D::Error::custom(format!(
            "match_percentage must be a number, got {other}"
        ))),
    }
}

/// Outcome of the single ranking request.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingOutcome {
    Parsed(Vec<RankingEntry>),
    Malformed { reason: String },
}

impl RankingOutcome {
    pub fn malformed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            "unknown ranking failure".to_string()
        } else {
            reason
        };
        RankingOutcome::Malformed { reason }
    }
}

/// A validated ranking, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub run_id: Uuid,
    pub ranked_at: DateTime<Utc>,
    pub model: String,
    /// Ordered by ascending rank.
    pub entries: Vec<RankingEntry>,
    /// Documents left out because their text could not be extracted.
    pub skipped: Vec<SkippedDocument>,
}
