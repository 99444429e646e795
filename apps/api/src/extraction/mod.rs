//! Extraction Client: sends page images or resume text to the model with the
//! schema v1 instruction and turns the reply into an `ExtractionResult`.
//!
//! Both entry points share one tail: sanitize → JSON → typed `ResumeRecord`.
//! Model-call errors are reported, never retried.

pub mod prompts;
pub mod schema;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::FailureKind;
use crate::imaging::{PageImage, RenderedDocument, MIN_TEXT_CHARS};
use crate::llm_client::sanitize::{excerpt, sanitize};
use crate::llm_client::{
    ChatBackend, ChatMessage, CompletionOptions, ContentPart, ImageDetail, ImageUrl,
};

use self::prompts::{text_instruction, vision_instruction, TEXT_SYSTEM, VISION_SYSTEM};
use self::schema::{ResumeRecord, SCHEMA_VERSION};

pub const EXTRACTION_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 4000,
    temperature: 0.1,
};

/// Length of the raw-reply excerpt attached to parse failures.
pub const RAW_EXCERPT_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Vision,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    Success {
        structured_record: ResumeRecord,
        /// Page images sent to the model; 0 on the text path.
        pages_processed: usize,
        method: ExtractionMethod,
    },
    Failure {
        kind: FailureKind,
        error_message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_response_excerpt: Option<String>,
    },
}

impl ExtractionResult {
    pub fn failure(kind: FailureKind, error_message: impl Into<String>) -> Self {
        ExtractionResult::Failure {
            kind,
            error_message: error_message.into(),
            raw_response_excerpt: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }
}

/// Routes a rendered document to the matching entry point.
pub async fn extract(llm: &dyn ChatBackend, document: &RenderedDocument) -> ExtractionResult {
    match document {
        RenderedDocument::Pages(pages) => extract_from_images(llm, pages).await,
        RenderedDocument::TextBody(text) => extract_from_text(llm, text).await,
    }
}

pub async fn extract_from_images(llm: &dyn ChatBackend, images: &[PageImage]) -> ExtractionResult {
    if images.is_empty() {
        return ExtractionResult::failure(
            FailureKind::Conversion,
            "No images were extracted from the file",
        );
    }

    let mut parts: Vec<ContentPart> = images
        .iter()
        .map(|page| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: page.data_url(),
                detail: ImageDetail::High,
            },
        })
        .collect();
    parts.push(ContentPart::Text {
        text: vision_instruction(),
    });

    let messages = [
        ChatMessage::system(VISION_SYSTEM),
        ChatMessage::user_parts(parts),
    ];

    info!("Calling model with {} page image(s)", images.len());
    complete_and_parse(llm, &messages, ExtractionMethod::Vision, images.len()).await
}

pub async fn extract_from_text(llm: &dyn ChatBackend, text: &str) -> ExtractionResult {
    let chars = text.trim().chars().count();
    if chars < MIN_TEXT_CHARS {
        return ExtractionResult::failure(
            FailureKind::Validation,
            format!("Text content is too short or empty ({chars} characters, minimum {MIN_TEXT_CHARS})"),
        );
    }

    let messages = [
        ChatMessage::system(TEXT_SYSTEM),
        ChatMessage::user(text_instruction(text)),
    ];

    info!("Calling model with {} characters of text", chars);
    complete_and_parse(llm, &messages, ExtractionMethod::Text, 0).await
}

async fn complete_and_parse(
    llm: &dyn ChatBackend,
    messages: &[ChatMessage],
    method: ExtractionMethod,
    pages_processed: usize,
) -> ExtractionResult {
    let reply = match llm.complete(messages, &EXTRACTION_OPTIONS).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Extraction call failed: {e}");
            return ExtractionResult::failure(FailureKind::ModelCall, format!("API error: {e}"));
        }
    };
    info!("Received response ({} chars)", reply.len());

    match parse_record(&reply) {
        Ok(structured_record) => ExtractionResult::Success {
            structured_record,
            pages_processed,
            method,
        },
        Err(message) => {
            warn!("{message}; reply starts: {}", excerpt(&reply, 300));
            ExtractionResult::Failure {
                kind: FailureKind::Parse,
                error_message: message,
                raw_response_excerpt: Some(excerpt(&reply, RAW_EXCERPT_CHARS)),
            }
        }
    }
}

/// Sanitizes a model reply and validates it against the resume schema.
pub fn parse_record(reply: &str) -> Result<ResumeRecord, String> {
    let value: serde_json::Value = serde_json::from_str(sanitize(reply))
        .map_err(|e| format!("Invalid JSON response: {e}"))?;

    if !value.is_object() {
        return Err(format!(
            "Invalid JSON response: expected an object, got {}",
            json_type_name(&value)
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| format!("Response does not match resume schema v{SCHEMA_VERSION}: {e}"))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
