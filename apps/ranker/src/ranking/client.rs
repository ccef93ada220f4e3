//! Ranking client: one model call, fence stripping and a strict JSON parse.
//!
//! Every failure below this point is folded into `RankingOutcome::Malformed`;
//! nothing is propagated as an error.

use tracing::{info, warn};

use crate::llm_client::{strip_json_fences, RankingModel};
use crate::ranking::models::{RankingEntry, RankingOutcome, ERROR_SENTINEL_FILENAME};

/// Sends `prompt` exactly once and parses the reply.
pub async fn rank_candidates(model: &dyn RankingModel, api_key: &str, prompt: &str) -> RankingOutcome {
    info!(
        model = model.model_id(),
        prompt_chars = prompt.chars().count(),
        "sending ranking request"
    );

    match model.generate(api_key, prompt).await {
        Ok(text) => parse_ranking_response(&text),
        Err(e) => {
            warn!("ranking request failed: {e}");
            RankingOutcome::malformed(e.to_string())
        }
    }
}

/// Parses the model's free-text reply as a JSON array of ranking entries.
pub fn parse_ranking_response(text: &str) -> RankingOutcome {
    let cleaned = strip_json_fences(text);

    let entries: Vec<RankingEntry> = match serde_json::from_str(cleaned) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("model response is not a ranking array: {e}");
            return RankingOutcome::malformed(format!("invalid ranking JSON: {e}"));
        }
    };

    if let Some(first) = entries.first() {
        if first.filename == ERROR_SENTINEL_FILENAME {
            return RankingOutcome::malformed(if first.reason.is_empty() {
                "model reported an error".to_string()
            } else {
                first.reason.clone()
            });
        }
    }

    RankingOutcome::Parsed(entries)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;

    /// Stub backend: returns a canned reply and counts calls.
    pub(crate) struct StubModel {
        pub reply: Result<String, String>,
        pub calls: AtomicUsize,
    }

    impl StubModel {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing(status: u16, message: &str) -> Self {
            Self {
                reply: Err(format!("{status}:{message}")),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RankingModel for StubModel {
        async fn generate(&self, _api_key: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(raw) => {
                    let (status, message) = raw.split_once(':').unwrap_or(("500", raw));
                    Err(LlmError::Api {
                        status: status.parse().unwrap_or(500),
                        message: message.to_string(),
                    })
                }
            }
        }

        fn model_id(&self) -> &str {
            "stub-model"
        }
    }

    const PAYLOAD: &str = r#"[{"rank":1,"filename":"a.pdf","candidate_name":"Ann","match_percentage":90,"skills_match":["Rust"],"missing_skills":[],"reason":"Best fit"}]"#;

    #[test]
    fn test_fenced_and_plain_payloads_parse_identically() {
        let fenced = format!("```json\n{PAYLOAD}\n```");
        assert_eq!(parse_ranking_response(&fenced), parse_ranking_response(PAYLOAD));
        assert!(matches!(parse_ranking_response(PAYLOAD), RankingOutcome::Parsed(ref e) if e.len() == 1));
    }

    #[test]
    fn test_generic_fence_is_stripped() {
        let fenced = format!("```\n{PAYLOAD}\n```");
        assert_eq!(parse_ranking_response(&fenced), parse_ranking_response(PAYLOAD));
    }

    #[test]
    fn test_invalid_json_is_malformed_with_reason() {
        match parse_ranking_response("Sorry, I cannot rank these candidates.") {
            RankingOutcome::Malformed { reason } => assert!(!reason.is_empty()),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_object_top_level_is_malformed() {
        let text = r#"{"rank":1,"filename":"a.pdf","match_percentage":90}"#;
        assert!(matches!(parse_ranking_response(text), RankingOutcome::Malformed { .. }));
    }

    #[test]
    fn test_null_free_text_fields_still_parse() {
        let outcome = parse_ranking_response(
            r#"[{"rank": 1, "filename": "a.pdf", "candidate_name": null,
                 "match_percentage": 80, "skills_match": ["Rust"], "missing_skills": [],
                 "reason": null}]"#,
        );
        match outcome {
            RankingOutcome::Parsed(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].candidate_name, "");
                assert_eq!(entries[0].reason, "");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_empty_array_parses_as_empty() {
        assert_eq!(parse_ranking_response("[]"), RankingOutcome::Parsed(vec![]));
    }

    #[test]
    fn test_sentinel_filename_is_malformed() {
        let text = r#"[{"rank":1,"filename":"Error","match_percentage":0,"reason":"quota exceeded"}]"#;
        assert_eq!(
            parse_ranking_response(text),
            RankingOutcome::Malformed {
                reason: "quota exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rank_candidates_calls_model_once() {
        let model = StubModel::replying(PAYLOAD);
        let outcome = rank_candidates(&model, "key", "prompt").await;
        assert_eq!(model.call_count(), 1);
        assert!(matches!(outcome, RankingOutcome::Parsed(_)));
    }

    #[tokio::test]
    async fn test_rank_candidates_request_failure_is_malformed() {
        let model = StubModel::failing(403, "API key not valid");
        let outcome = rank_candidates(&model, "bad-key", "prompt").await;
        assert_eq!(model.call_count(), 1);
        match outcome {
            RankingOutcome::Malformed { reason } => assert!(reason.contains("API key not valid")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }
}
