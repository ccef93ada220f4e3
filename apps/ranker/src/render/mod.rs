//! Server-rendered HTML for the ranking form and results.
//!
//! This module owns every operator-facing message. Lower layers hand back
//! typed errors; the wording lives here.

use std::fmt::Write;

use crate::extraction::SkippedDocument;
use crate::ranking::models::{RankingEntry, RankingReport, SkillList};
use crate::ranking::pipeline::{
    InputValidationError, PipelineError, MAX_DOCUMENTS, MIN_JOB_DESCRIPTION_CHARS,
};

pub const RANKING_FAILURE_MESSAGE: &str = "AI failed to return a valid ranking. Please try again.";
pub const NO_USABLE_DOCUMENTS_MESSAGE: &str =
    "Could not extract text from any of the uploaded files.";

pub const UPLOAD_TOO_LARGE_MESSAGE: &str =
    "The upload is too large. Please submit smaller or fewer files.";

const PAGE_TITLE: &str = "ATS Ranker";

/// Operator-facing text for a failed invocation.
pub fn operator_message(error: &PipelineError) -> String {
    match error {
        PipelineError::Validation(e) => validation_message(e),
        PipelineError::NoUsableDocuments { .. } => NO_USABLE_DOCUMENTS_MESSAGE.to_string(),
        PipelineError::RankingFailed { .. } | PipelineError::InvalidRanking(_) => {
            RANKING_FAILURE_MESSAGE.to_string()
        }
        PipelineError::ExtractionWorker(_) => {
            "Something went wrong while reading the files. Please try again.".to_string()
        }
    }
}

pub fn validation_message(error: &InputValidationError) -> String {
    match error {
        InputValidationError::MissingCredential => "Please enter your API Key.".to_string(),
        InputValidationError::JobDescriptionTooShort { .. } => format!(
            "Please paste a valid Job Description (at least {MIN_JOB_DESCRIPTION_CHARS} characters)."
        ),
        InputValidationError::NoDocuments => "Please upload at least one resume.".to_string(),
        InputValidationError::TooManyDocuments { .. } => {
            format!("Limit is {MAX_DOCUMENTS} resumes for this version.")
        }
        InputValidationError::UnsupportedDocument(name) => {
            format!("Only PDF and DOCX resumes are supported ({name}).")
        }
        InputValidationError::DuplicateFilename(name) => {
            format!("Each resume must have a distinct filename ({name}).")
        }
    }
}

/// The input form.
pub fn render_form_page() -> String {
    let body = format!(
        r#"<p class="lead">Upload 1-{MAX_DOCUMENTS} resumes and a job description to get a ranked leaderboard.</p>
<form method="post" action="/rank" enctype="multipart/form-data">
  <label for="api_key">Gemini API Key</label>
  <input type="password" id="api_key" name="api_key" autocomplete="off">
  <label for="resumes">Resumes (PDF or DOCX, up to {MAX_DOCUMENTS})</label>
  <input type="file" id="resumes" name="resumes" accept=".pdf,.docx" multiple>
  <label for="job_description">Job Description</label>
  <textarea id="job_description" name="job_description" rows="14" placeholder="Paste the job description here (at least {MIN_JOB_DESCRIPTION_CHARS} characters)"></textarea>
  <button type="submit">Rank Candidates</button>
</form>"#
    );
    page(&body)
}

/// Leaderboard plus one detail panel per candidate.
pub fn render_results_page(report: &RankingReport) -> String {
    let mut body = String::new();

    body.push_str("<h2>Candidate Leaderboard</h2>\n");
    if !report.skipped.is_empty() {
        body.push_str(&skipped_notice(
            "Some files were left out of the ranking:",
            &report.skipped,
        ));
    }

    body.push_str(
        "<table class=\"leaderboard\">\n<thead><tr><th>Rank</th><th>Match %</th><th>Name</th>\
         <th>File</th><th>AI Analysis</th></tr></thead>\n<tbody>\n",
    );
    for entry in &report.entries {
        body.push_str(&summary_row(entry));
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str("<h2>Detailed Analysis</h2>\n");
    for entry in &report.entries {
        body.push_str(&detail_panel(entry));
    }

    let _ = write!(
        body,
        "<p class=\"meta\">Ranked by {} at {}</p>\n<p><a href=\"/\">Rank another batch</a></p>",
        html_escape(&report.model),
        report.ranked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    page(&body)
}

/// A single failure notice. Never includes a partial table.
pub fn render_failure_page(message: &str, skipped: &[SkippedDocument]) -> String {
    let mut body = format!("<div class=\"error\">{}</div>\n", html_escape(message));
    if !skipped.is_empty() {
        body.push_str(&skipped_notice("Files that could not be read:", skipped));
    }
    body.push_str("<p><a href=\"/\">Back to the form</a></p>");
    page(&body)
}

fn summary_row(entry: &RankingEntry) -> String {
    let pct = entry.match_percentage.clamp(0, 100);
    format!(
        "<tr><td>{rank}</td><td><div class=\"bar\"><span style=\"width:{pct}%\"></span></div>{pct}%</td>\
         <td>{name}</td><td>{file}</td><td>{reason}</td></tr>\n",
        rank = entry.rank,
        name = html_escape(display_name(entry)),
        file = html_escape(&entry.filename),
        reason = html_escape(&entry.reason),
    )
}

fn detail_panel(entry: &RankingEntry) -> String {
    format!(
        "<details>\n<summary>#{rank} - {name} ({pct}%)</summary>\n\
         <p><strong>Why:</strong> {reason}</p>\n\
         <p><strong>Skills:</strong> {skills}</p>\n\
         <p><strong>Missing:</strong> {missing}</p>\n</details>\n",
        rank = entry.rank,
        name = html_escape(display_name(entry)),
        pct = entry.match_percentage,
        reason = html_escape(&entry.reason),
        skills = html_escape(&skills_text(&entry.skills_match)),
        missing = html_escape(&skills_text(&entry.missing_skills)),
    )
}

fn skipped_notice(heading: &str, skipped: &[SkippedDocument]) -> String {
    let mut out = format!("<div class=\"warning\">{}\n<ul>\n", html_escape(heading));
    for doc in skipped {
        let _ = writeln!(
            out,
            "<li>{}: {}</li>",
            html_escape(&doc.filename),
            html_escape(&doc.message)
        );
    }
    out.push_str("</ul>\n</div>\n");
    out
}

fn display_name(entry: &RankingEntry) -> &str {
    if entry.candidate_name.trim().is_empty() {
        "Unknown"
    } else {
        &entry.candidate_name
    }
}

fn skills_text(skills: &SkillList) -> String {
    if skills.is_empty() {
        "None".to_string()
    } else {
        skills.display()
    }
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{PAGE_TITLE}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }}
label {{ display: block; margin-top: 1rem; font-weight: 600; }}
input[type=password], textarea {{ width: 100%; box-sizing: border-box; }}
button {{ margin-top: 1rem; padding: .6rem 1.4rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; vertical-align: top; }}
.bar {{ background: #eee; height: .5rem; width: 6rem; }}
.bar span {{ background: #2b8a3e; display: block; height: 100%; }}
.error {{ background: #ffe3e3; border: 1px solid #c92a2a; padding: .8rem; }}
.warning {{ background: #fff3bf; border: 1px solid #e67700; padding: .8rem; margin-bottom: 1rem; }}
details {{ margin: .4rem 0; }}
.meta {{ color: #666; font-size: .9rem; }}
</style>
</head>
<body>
<h1>{PAGE_TITLE}</h1>
{body}
</body>
</html>
"#
    )
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
