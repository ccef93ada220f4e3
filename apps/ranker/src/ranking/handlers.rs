//! Axum route handlers for the ranking form and JSON API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::{ExtractionProgress, UploadedDocument};
use crate::ranking::models::RankingReport;
use crate::ranking::pipeline::{run_ranking, PipelineError, RankingRequest, Stage};
use crate::render::{
    operator_message, render_failure_page, render_form_page, render_results_page,
    UPLOAD_TOO_LARGE_MESSAGE,
};
use crate::state::AppState;

const API_KEY_FIELD: &str = "api_key";
const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUMES_FIELD: &str = "resumes";

/// GET /
pub async fn handle_form() -> Html<String> {
    debug!(stage = %Stage::AwaitingInput, "serving ranking form");
    Html(render_form_page())
}

/// POST /rank
///
/// Form submission from the browser; always answers with an HTML page.
pub async fn handle_rank_page(
    State(state): State<AppState>,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let request = match read_ranking_form(multipart).await {
        Ok(request) => request,
        Err(e) => return (e.status_code(), Html(render_failure_page(&e.public_message(), &[]))),
    };

    match run_ranking(request, state.model.as_ref(), log_progress).await {
        Ok(report) => (StatusCode::OK, Html(render_results_page(&report))),
        Err(e) => {
            let message = operator_message(&e);
            let skipped = match &e {
                PipelineError::NoUsableDocuments { skipped } => skipped.clone(),
                _ => Vec::new(),
            };
            let status = AppError::from(e).status_code();
            (status, Html(render_failure_page(&message, &skipped)))
        }
    }
}

/// POST /api/v1/rank
///
/// Same multipart input as the form; returns the validated ranking as JSON.
pub async fn handle_rank_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankingReport>, AppError> {
    let request = read_ranking_form(multipart).await?;
    let report = run_ranking(request, state.model.as_ref(), log_progress).await?;
    Ok(Json(report))
}

fn log_progress(progress: ExtractionProgress<'_>) {
    info!(
        completed = progress.completed,
        total = progress.total,
        percent = (progress.fraction() * 100.0).round() as u32,
        "Reading {}...",
        progress.filename
    );
}

/// Collects the credential, job description and résumé files from the form.
/// File inputs submitted without a selection arrive as empty parts and are ignored.
async fn read_ranking_form(mut multipart: Multipart) -> Result<RankingRequest, AppError> {
    let mut api_key = String::new();
    let mut job_description = String::new();
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            API_KEY_FIELD => api_key = read_text(field).await?,
            JOB_DESCRIPTION_FIELD => job_description = read_text(field).await?,
            RESUMES_FIELD => {
                let filename = field.file_name().map(base_filename).unwrap_or_default();
                let bytes = field.bytes().await.map_err(upload_error)?;
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                documents.push(UploadedDocument::new(filename, bytes));
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(RankingRequest {
        api_key,
        job_description,
        documents,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(upload_error)
}

/// A body over the configured limit surfaces here as a multipart error.
fn upload_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(UPLOAD_TOO_LARGE_MESSAGE.to_string())
    } else {
        AppError::Validation(format!("Malformed upload: {error}"))
    }
}

/// Some browsers send the client-side path; keep only the last component.
fn base_filename(raw: &str) -> String {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_filename_strips_client_paths() {
        assert_eq!(base_filename("C:\\Users\\hr\\alice.pdf"), "alice.pdf");
        assert_eq!(base_filename("/home/hr/bob.docx"), "bob.docx");
        assert_eq!(base_filename("carol.pdf"), "carol.pdf");
        assert_eq!(base_filename(""), "");
    }
}
