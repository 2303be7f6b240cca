//! Email parsing and classification handlers
//!
//! Author: hephaex@gmail.com

use crate::error::{ApiError, AppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use jobmail_core::{ApplicationStatus, EmailInput, JobApplication, JobmailError};
use jobmail_extractor::Classification;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Parse request body
///
/// Accepts the field names used by both mail clients that call this service.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ParseRequest {
    /// Email subject line
    #[serde(default)]
    pub subject: String,
    /// Plain-text email body
    #[serde(default, alias = "content")]
    pub body: String,
    /// Sender address, optionally with a display name
    #[serde(default, rename = "senderAddress", alias = "from_email", alias = "from")]
    pub sender_address: String,
}

impl From<ParseRequest> for EmailInput {
    fn from(req: ParseRequest) -> Self {
        EmailInput::new(req.subject, req.body, req.sender_address)
    }
}

/// Parse response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    /// Employer, or `Unknown Company`
    pub company: String,
    /// Job title, or `Position Not Found`
    pub position: String,
    /// Time the email was parsed (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub date_applied: DateTime<Utc>,
    /// Always `applied` for a freshly parsed email
    #[schema(value_type = String, example = "applied")]
    pub status: ApplicationStatus,
    /// Completeness score in [0, 1]
    pub confidence_score: f32,
}

impl From<JobApplication> for ParseResponse {
    fn from(app: JobApplication) -> Self {
        Self {
            company: app.company,
            position: app.position,
            date_applied: app.date_applied,
            status: app.status,
            confidence_score: app.confidence_score,
        }
    }
}

/// Extract company, position and confidence from one email
#[utoipa::path(
    post,
    path = "/api/v1/parse",
    tag = "parse",
    request_body = ParseRequest,
    responses(
        (status = 200, description = "Email parsed", body = ParseResponse),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 502, description = "NER service unavailable", body = ApiError)
    )
)]
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, AppError> {
    let email = EmailInput::from(req);

    let result = state.parser.parse(&email).await.map_err(|e| {
        if matches!(e, JobmailError::Ner(_)) {
            state.record_ner_failure();
            warn!(error = %e, "NER tagger failed");
        }
        AppError::from(e)
    })?;

    info!(
        found_company = result.company.is_some(),
        found_position = result.position.is_some(),
        confidence = result.confidence_score,
        "Parse completed"
    );

    let application = JobApplication::from_extraction(&result, Utc::now());
    Ok(Json(ParseResponse::from(application)))
}

/// Classify request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    #[serde(default, alias = "from_email", alias = "senderAddress")]
    pub from: String,
    #[serde(default)]
    pub subject: String,
}

/// Classify response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub is_job_application: bool,
    /// Applicant-tracking system that sent the email, if recognised
    pub provider: Option<String>,
    pub reason: String,
}

impl From<Classification> for ClassifyResponse {
    fn from(c: Classification) -> Self {
        Self {
            is_job_application: c.is_job_application,
            provider: c.provider.map(|p| p.domain().to_string()),
            reason: c.reason,
        }
    }
}

/// Decide whether an email looks like a job-application message
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    tag = "parse",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Email classified", body = ClassifyResponse),
        (status = 400, description = "Malformed request body", body = ApiError)
    )
)]
pub async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let classification = state.classifier.classify(&req.from, &req.subject);
    Json(ClassifyResponse::from(classification))
}
