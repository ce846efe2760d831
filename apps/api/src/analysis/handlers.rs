use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::MediaType;
use crate::models::analysis::{AnalyzeTextRequest, ResumeAnalysis};
use crate::state::AppState;
use crate::taxonomy::CareerPath;

const UPLOAD_FIELD: &str = "file";
const MIB: usize = 1024 * 1024;

/// POST /api/v1/analyze
/// Multipart upload with a single `file` field (PDF or plain text).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let limit = state.config.max_upload_bytes;

    let mut upload: Option<(Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        info!(file_name = %file_name, bytes = data.len(), "Resume upload received");
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Please select a file to upload".to_string()))?;
    let media_type = validate_upload(content_type.as_deref(), data.len(), limit)?;

    let analysis = state.analyzer.analyze(data, media_type.mime()).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/analyze/text
/// Same pipeline for text pasted into the client.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let limit = state.config.max_upload_bytes;
    if req.text.len() > limit {
        return Err(too_large(req.text.len(), limit));
    }

    let analysis = state
        .analyzer
        .analyze(Bytes::from(req.text), MediaType::PlainText.mime())
        .await?;
    Ok(Json(analysis))
}

/// GET /api/v1/career-paths
pub async fn handle_list_career_paths(State(state): State<AppState>) -> Json<Vec<CareerPath>> {
    Json(state.analyzer.taxonomy().career_paths.clone())
}

/// Admission checks run before any bytes reach the pipeline: a declared type,
/// a non-empty body, the size limit, then the allowed type list.
pub fn validate_upload(
    content_type: Option<&str>,
    size: usize,
    limit: usize,
) -> Result<MediaType, AppError> {
    let content_type = content_type.map(str::trim).unwrap_or_default();
    if content_type.is_empty() {
        return Err(AppError::Validation(
            "Unable to determine file type. Please upload a PDF or text file".to_string(),
        ));
    }
    if size == 0 {
        return Err(AppError::Validation(
            "The selected file appears to be empty".to_string(),
        ));
    }
    if size > limit {
        return Err(too_large(size, limit));
    }
    content_type.parse()
}

fn too_large(size: usize, limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size ({:.1}MB) exceeds the {}MB limit. Please upload a smaller file",
        size as f64 / MIB as f64,
        limit / MIB
    ))
}

/// Bodies over the router's byte limit fail while streaming, before the size
/// check above can see them.
fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Upload exceeds the {}MB limit. Please upload a smaller file",
            limit / MIB
        ))
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}
