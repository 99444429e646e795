//! Template Merge Client: asks the model to pour a `ResumeRecord` into a
//! LaTeX template and checks the reply's document boundaries.

pub mod checks;
pub mod prompts;
pub mod templates;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::FailureKind;
use crate::extraction::schema::ResumeRecord;
use crate::extraction::RAW_EXCERPT_CHARS;
use crate::llm_client::sanitize::{excerpt, strip_code_fences};
use crate::llm_client::{ChatBackend, ChatMessage, CompletionOptions};

use self::checks::{braces_balanced, has_document_boundaries};
use self::prompts::{merge_prompt, MERGE_SYSTEM};

pub const MERGE_OPTIONS: CompletionOptions = CompletionOptions {
    max_tokens: 8000,
    temperature: 0.1,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeResult {
    Success {
        latex_text: String,
        /// Diagnostic only: an imbalance is logged but does not fail the merge.
        brace_balanced: bool,
    },
    Failure {
        kind: FailureKind,
        error_message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw_response_excerpt: Option<String>,
    },
}

/// Builds the user turn: template between markers, then the record as JSON.
pub fn build_merge_prompt(template: &str, record: &ResumeRecord) -> Result<String, serde_json::Error> {
    let resume_json = serde_json::to_string_pretty(record)?;
    Ok(merge_prompt(template, &resume_json))
}

pub async fn merge(llm: &dyn ChatBackend, template: &str, record: &ResumeRecord) -> MergeResult {
    let prompt = match build_merge_prompt(template, record) {
        Ok(prompt) => prompt,
        Err(e) => {
            return MergeResult::Failure {
                kind: FailureKind::Validation,
                error_message: format!("LaTeX merge failed: could not serialize resume: {e}"),
                raw_response_excerpt: None,
            }
        }
    };

    let messages = [ChatMessage::system(MERGE_SYSTEM), ChatMessage::user(prompt)];

    info!("Calling model to merge resume into template ({} bytes)", template.len());
    let reply = match llm.complete(&messages, &MERGE_OPTIONS).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Merge call failed: {e}");
            return MergeResult::Failure {
                kind: FailureKind::ModelCall,
                error_message: format!("LaTeX merge failed: {e}"),
                raw_response_excerpt: None,
            };
        }
    };

    let latex = strip_code_fences(&reply);
    if !has_document_boundaries(latex) {
        warn!("Merge reply lacks document boundaries; starts: {}", excerpt(latex, 300));
        return MergeResult::Failure {
            kind: FailureKind::Parse,
            error_message: "LaTeX merge failed: output must start with \\documentclass and end with \\end{document}".to_string(),
            raw_response_excerpt: Some(excerpt(&reply, RAW_EXCERPT_CHARS)),
        };
    }

    let brace_balanced = braces_balanced(latex);
    if !brace_balanced {
        warn!("Merged LaTeX has unbalanced braces; it may not compile");
    }

    MergeResult::Success {
        latex_text: latex.to_string(),
        brace_balanced,
    }
}
