//! Ranking pipeline: one invocation from submitted form to validated ranking.
//!
//! Flow: validate_request → extract_all → build_ranking_prompt →
//!       rank_candidates → validate_ranking → RankingReport.
//!
//! Stages run strictly in sequence. Nothing is kept between invocations.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extraction::{
    extract_all, DocumentFormat, ExtractionProgress, SkippedDocument, UploadedDocument,
};
use crate::llm_client::RankingModel;
use crate::ranking::client::rank_candidates;
use crate::ranking::models::{RankingOutcome, RankingReport};
use crate::ranking::prompts::build_ranking_prompt;
use crate::ranking::validation::{validate_ranking, StructuralError};

pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
pub const MAX_DOCUMENTS: usize = 5;

/// Inputs for one ranking invocation.
#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub api_key: String,
    pub job_description: String,
    pub documents: Vec<UploadedDocument>,
}

/// Per-invocation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingInput,
    Validating,
    ExtractingText,
    BuildingPrompt,
    AwaitingModelResponse,
    Rendering,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::AwaitingInput => "awaiting_input",
            Stage::Validating => "validating",
            Stage::ExtractingText => "extracting_text",
            Stage::BuildingPrompt => "building_prompt",
            Stage::AwaitingModelResponse => "awaiting_model_response",
            Stage::Rendering => "rendering",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("API credential is missing")]
    MissingCredential,

    #[error("job description has {actual} characters, at least {min} required")]
    JobDescriptionTooShort { actual: usize, min: usize },

    #[error("no documents were uploaded")]
    NoDocuments,

    #[error("{actual} documents uploaded, at most {max} allowed")]
    TooManyDocuments { actual: usize, max: usize },

    #[error("unsupported document '{0}'")]
    UnsupportedDocument(String),

    #[error("filename '{0}' was uploaded more than once")]
    DuplicateFilename(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input validation failed: {0}")]
    Validation(#[from] InputValidationError),

    #[error("no document produced usable text ({} skipped)", .skipped.len())]
    NoUsableDocuments { skipped: Vec<SkippedDocument> },

    #[error("ranking request failed: {reason}")]
    RankingFailed { reason: String },

    #[error("ranking failed validation: {0}")]
    InvalidRanking(#[from] StructuralError),

    #[error("extraction worker failed: {0}")]
    ExtractionWorker(String),
}

impl PipelineError {
    /// Stage the invocation was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Validation(_) => Stage::Validating,
            PipelineError::NoUsableDocuments { .. } | PipelineError::ExtractionWorker(_) => {
                Stage::ExtractingText
            }
            PipelineError::RankingFailed { .. } | PipelineError::InvalidRanking(_) => {
                Stage::AwaitingModelResponse
            }
        }
    }
}

/// Upfront checks; nothing is extracted or sent unless all of them pass.
pub fn validate_request(request: &RankingRequest) -> Result<(), InputValidationError> {
    if request.api_key.trim().is_empty() {
        return Err(InputValidationError::MissingCredential);
    }

    let jd_chars = request.job_description.chars().count();
    if jd_chars < MIN_JOB_DESCRIPTION_CHARS {
        return Err(InputValidationError::JobDescriptionTooShort {
            actual: jd_chars,
            min: MIN_JOB_DESCRIPTION_CHARS,
        });
    }

    if request.documents.is_empty() {
        return Err(InputValidationError::NoDocuments);
    }
    if request.documents.len() > MAX_DOCUMENTS {
        return Err(InputValidationError::TooManyDocuments {
            actual: request.documents.len(),
            max: MAX_DOCUMENTS,
        });
    }

    let mut seen = HashSet::new();
    for document in &request.documents {
        if DocumentFormat::from_filename(&document.filename).is_err() {
            return Err(InputValidationError::UnsupportedDocument(
                document.filename.clone(),
            ));
        }
        if !seen.insert(document.filename.as_str()) {
            return Err(InputValidationError::DuplicateFilename(
                document.filename.clone(),
            ));
        }
    }

    Ok(())
}

/// Runs one full invocation.
///
/// `on_progress` observes extraction; it runs on the blocking worker.
pub async fn run_ranking<F>(
    request: RankingRequest,
    model: &dyn RankingModel,
    on_progress: F,
) -> Result<RankingReport, PipelineError>
where
    F: FnMut(ExtractionProgress<'_>) + Send + 'static,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("ranking_run", %run_id, documents = request.documents.len());

    let result = execute(run_id, request, model, on_progress)
        .instrument(span.clone())
        .await;

    if let Err(e) = &result {
        let _guard = span.enter();
        warn!(failed_at = %e.stage(), stage = %Stage::Failed, "ranking run failed: {e}");
    }
    result
}

async fn execute<F>(
    run_id: Uuid,
    request: RankingRequest,
    model: &dyn RankingModel,
    on_progress: F,
) -> Result<RankingReport, PipelineError>
where
    F: FnMut(ExtractionProgress<'_>) + Send + 'static,
{
    enter(Stage::Validating);
    validate_request(&request)?;

    let RankingRequest {
        api_key,
        job_description,
        documents,
    } = request;

    enter(Stage::ExtractingText);
    let batch = tokio::task::spawn_blocking(move || extract_all(&documents, on_progress))
        .await
        .map_err(|e| PipelineError::ExtractionWorker(e.to_string()))?;

    if batch.candidates.is_empty() {
        return Err(PipelineError::NoUsableDocuments {
            skipped: batch.skipped,
        });
    }
    info!(
        extracted = batch.candidates.len(),
        skipped = batch.skipped.len(),
        "extraction finished"
    );

    enter(Stage::BuildingPrompt);
    let prompt = build_ranking_prompt(&batch.candidates, &job_description);

    enter(Stage::AwaitingModelResponse);
    let entries = match rank_candidates(model, &api_key, &prompt).await {
        RankingOutcome::Parsed(entries) => entries,
        RankingOutcome::Malformed { reason } => {
            return Err(PipelineError::RankingFailed { reason })
        }
    };

    let filenames: Vec<String> = batch.candidates.into_iter().map(|(name, _)| name).collect();
    let entries = validate_ranking(entries, &filenames)?;

    enter(Stage::Rendering);
    Ok(RankingReport {
        run_id,
        ranked_at: chrono::Utc::now(),
        model: model.model_id().to_string(),
        entries,
        skipped: batch.skipped,
    })
}

fn enter(stage: Stage) {
    info!(%stage, "entering stage");
}
