//! Pipeline Orchestrator: one request, strictly in sequence:
//!
//! Received → Saved → Rendered → Extracted → (Merged) → Completed
//!
//! A failure anywhere ends the request as `Failed(stage, error)`, where
//! `stage` is the last state reached. The transient upload is owned by the
//! run and deleted on every exit path.

pub mod handlers;
pub mod upload;

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::errors::FailureKind;
use crate::extraction::schema::ResumeRecord;
use crate::extraction::{self, ExtractionMethod, ExtractionResult};
use crate::imaging::convert::DocumentConverter;
use crate::imaging::pdf::PageRasterizer;
use crate::imaging::{DocumentFormat, ImagePipeline, RenderError, RenderedDocument};
use crate::latex::templates::{load_template, TemplateError};
use crate::latex::{self, MergeResult};
use crate::llm_client::sanitize::excerpt;
use crate::llm_client::ChatBackend;
use crate::state::AppState;

use self::upload::{validate_upload, TransientUpload, Upload, ValidatedUpload};

/// Characters of merged LaTeX echoed back in the process response.
pub const LATEX_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Saved,
    Rendered,
    Extracted,
    Merged,
    Completed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{message}")]
    Extraction {
        kind: FailureKind,
        message: String,
        raw_response_excerpt: Option<String>,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{message}")]
    Merge {
        kind: FailureKind,
        message: String,
        raw_response_excerpt: Option<String>,
    },
}

impl PipelineError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PipelineError::Storage { .. } | PipelineError::Template(TemplateError::Io { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            PipelineError::Template(TemplateError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND")
            }
            PipelineError::Render(e) => (e.kind().status(), e.kind().code()),
            PipelineError::Extraction { kind, .. } | PipelineError::Merge { kind, .. } => {
                (kind.status(), kind.code())
            }
        }
    }

    pub fn raw_response_excerpt(&self) -> Option<&str> {
        match self {
            PipelineError::Extraction {
                raw_response_excerpt,
                ..
            }
            | PipelineError::Merge {
                raw_response_excerpt,
                ..
            } => raw_response_excerpt.as_deref(),
            _ => None,
        }
    }
}

/// Terminal `Failed(stage, error)` state.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: PipelineError,
}

impl PipelineFailure {
    fn at(stage: Stage, error: impl Into<PipelineError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub filename: String,
    pub size: usize,
    pub format: DocumentFormat,
    pub extraction: ExtractionResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub filename: String,
    pub structured_record: ResumeRecord,
    pub pages_processed: usize,
    pub method: ExtractionMethod,
    pub latex_file: String,
    pub latex_preview: String,
    pub brace_balanced: bool,
}

/// Borrowed collaborators for one request. No state outlives the call.
pub struct Pipeline<'a> {
    llm: &'a dyn ChatBackend,
    imaging: ImagePipeline<'a>,
    upload_dir: &'a Path,
    template_dir: &'a Path,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        llm: &'a dyn ChatBackend,
        rasterizer: &'a dyn PageRasterizer,
        converter: &'a dyn DocumentConverter,
        upload_dir: &'a Path,
        template_dir: &'a Path,
    ) -> Self {
        Self {
            llm,
            imaging: ImagePipeline::new(rasterizer, converter),
            upload_dir,
            template_dir,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(
            state.llm.as_ref(),
            state.rasterizer.as_ref(),
            state.converter.as_ref(),
            &state.config.upload_dir,
            &state.config.template_dir,
        )
    }

    /// Extract only. Render and model failures are reported inside the
    /// returned `ExtractionResult`; only validation and save failures are `Err`.
    pub async fn upload(&self, upload: Upload) -> Result<UploadReport, PipelineFailure> {
        let (validated, saved) = self.receive(&upload).await?;

        let extraction = match self.imaging.render(saved.path()).await {
            Ok(document) => {
                info!("{}: {:?}", validated.file_name, Stage::Rendered);
                self.extract(&validated, &document).await
            }
            Err(e) => {
                info!("{}: render failed: {e}", validated.file_name);
                ExtractionResult::failure(e.kind(), e.to_string())
            }
        };

        info!("{}: {:?}", validated.file_name, Stage::Completed);
        Ok(UploadReport {
            filename: validated.file_name,
            size: validated.size,
            format: validated.format,
            extraction,
        })
    }

    /// Extract, merge into template `template_id`, write `<stem>.tex` next to the uploads.
    pub async fn process(
        &self,
        upload: Upload,
        template_id: u32,
    ) -> Result<ProcessReport, PipelineFailure> {
        let (validated, saved) = self.receive(&upload).await?;

        let document = self
            .imaging
            .render(saved.path())
            .await
            .map_err(|e| PipelineFailure::at(Stage::Saved, e))?;
        info!("{}: {:?}", validated.file_name, Stage::Rendered);

        let (structured_record, pages_processed, method) =
            match self.extract(&validated, &document).await {
                ExtractionResult::Success {
                    structured_record,
                    pages_processed,
                    method,
                } => (structured_record, pages_processed, method),
                ExtractionResult::Failure {
                    kind,
                    error_message,
                    raw_response_excerpt,
                } => {
                    return Err(PipelineFailure::at(
                        Stage::Rendered,
                        PipelineError::Extraction {
                            kind,
                            message: error_message,
                            raw_response_excerpt,
                        },
                    ))
                }
            };

        let template = load_template(self.template_dir, template_id)
            .await
            .map_err(|e| PipelineFailure::at(Stage::Extracted, e))?;

        let (latex_text, brace_balanced) =
            match latex::merge(self.llm, &template, &structured_record).await {
                MergeResult::Success {
                    latex_text,
                    brace_balanced,
                } => (latex_text, brace_balanced),
                MergeResult::Failure {
                    kind,
                    error_message,
                    raw_response_excerpt,
                } => {
                    return Err(PipelineFailure::at(
                        Stage::Extracted,
                        PipelineError::Merge {
                            kind,
                            message: error_message,
                            raw_response_excerpt,
                        },
                    ))
                }
            };
        info!("{}: {:?} with template {}", validated.file_name, Stage::Merged, template_id);

        let latex_path = self.write_latex(&validated, &latex_text).await?;

        info!("{}: {:?}", validated.file_name, Stage::Completed);
        Ok(ProcessReport {
            filename: validated.file_name,
            structured_record,
            pages_processed,
            method,
            latex_file: latex_path.display().to_string(),
            latex_preview: excerpt(&latex_text, LATEX_PREVIEW_CHARS),
            brace_balanced,
        })
    }

    /// Received → Saved.
    async fn receive(
        &self,
        upload: &Upload,
    ) -> Result<(ValidatedUpload, TransientUpload), PipelineFailure> {
        info!("{}: {:?} ({} bytes)", upload.filename, Stage::Received, upload.bytes.len());

        let validated = validate_upload(upload)
            .map_err(|msg| PipelineFailure::at(Stage::Received, PipelineError::Validation(msg)))?;

        let saved = TransientUpload::save(self.upload_dir, &validated.file_name, &upload.bytes)
            .await
            .map_err(|source| {
                PipelineFailure::at(
                    Stage::Received,
                    PipelineError::Storage {
                        context: format!("Failed to save {}", validated.file_name),
                        source,
                    },
                )
            })?;

        info!("{}: {:?}", validated.file_name, Stage::Saved);
        Ok((validated, saved))
    }

    /// Rendered → Extracted.
    async fn extract(
        &self,
        validated: &ValidatedUpload,
        document: &RenderedDocument,
    ) -> ExtractionResult {
        let result = extraction::extract(self.llm, document).await;
        if result.is_success() {
            info!("{}: {:?}", validated.file_name, Stage::Extracted);
        }
        result
    }

    async fn write_latex(
        &self,
        validated: &ValidatedUpload,
        latex_text: &str,
    ) -> Result<PathBuf, PipelineFailure> {
        let path = self.upload_dir.join(format!("{}.tex", validated.stem()));
        tokio::fs::write(&path, latex_text).await.map_err(|source| {
            PipelineFailure::at(
                Stage::Merged,
                PipelineError::Storage {
                    context: format!("Failed to write {}", path.display()),
                    source,
                },
            )
        })?;
        Ok(path)
    }
}
