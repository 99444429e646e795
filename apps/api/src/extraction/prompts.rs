// Extraction prompt templates.
// All prompts for the extraction module are defined here.

use crate::extraction::schema::RESUME_SCHEMA_TEMPLATE;
use crate::llm_client::prompts::{JSON_OUTPUT_RULES, NO_FABRICATION_RULES};

pub const VISION_SYSTEM: &str = "\
You are an expert resume parser with advanced OCR capabilities. \
Extract all visible text accurately and comprehensively. \
Never fabricate information.";

pub const TEXT_SYSTEM: &str = "\
You are an expert resume parser. \
Extract all information accurately without fabricating data.";

/// Instruction block placed after the page images.
pub fn vision_instruction() -> String {
    format!(
        "Extract all information from these resume images into comprehensive JSON format.\n\n\
         {NO_FABRICATION_RULES}\n\n\
         Return JSON with this structure:\n{RESUME_SCHEMA_TEMPLATE}\n\n\
         {JSON_OUTPUT_RULES}"
    )
}

/// Single user turn for the text-only path, with the resume inlined.
pub fn text_instruction(resume_text: &str) -> String {
    format!(
        "Extract all information from this resume text into comprehensive JSON format.\n\n\
         RESUME TEXT:\n{resume_text}\n\n\
         {NO_FABRICATION_RULES}\n\n\
         Return JSON with this structure:\n{RESUME_SCHEMA_TEMPLATE}\n\n\
         {JSON_OUTPUT_RULES}"
    )
}
