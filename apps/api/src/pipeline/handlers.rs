use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::upload::Upload;
use crate::pipeline::{Pipeline, ProcessReport, UploadReport};
use crate::state::AppState;

/// Multipart field carrying the resume.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ProcessParams {
    #[serde(default = "default_template_id")]
    pub template_id: u32,
}

fn default_template_id() -> u32 {
    1
}

/// POST /api/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadReport>, AppError> {
    let upload = read_file_field(multipart).await?;
    let report = Pipeline::from_state(&state).upload(upload).await?;
    Ok(Json(report))
}

/// POST /api/process?template_id=N
pub async fn handle_process(
    State(state): State<AppState>,
    Query(params): Query<ProcessParams>,
    multipart: Multipart,
) -> Result<Json<ProcessReport>, AppError> {
    let upload = read_file_field(multipart).await?;
    let report = Pipeline::from_state(&state)
        .process(upload, params.template_id)
        .await?;
    Ok(Json(report))
}

/// Pulls the `file` part out of the form. Other fields are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        info!("Received upload {filename} ({} bytes)", bytes.len());
        return Ok(Upload { filename, bytes });
    }
    Err(AppError::Validation(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}
