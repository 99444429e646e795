// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting rules reused by several of them.

/// Output rules appended to every prompt that expects a bare JSON object.
pub const JSON_OUTPUT_RULES: &str = "\
OUTPUT RULES:
- Return ONLY valid JSON
- NO markdown code blocks (no ```json or ```)
- NO explanatory text before or after
- Start directly with { and end with }
- Use null for missing fields, not fake data";

/// Grounding rules shared by the extraction prompts.
pub const NO_FABRICATION_RULES: &str = "\
CRITICAL INSTRUCTIONS:
1. READ all text in the document carefully
2. Extract ONLY information that is ACTUALLY PRESENT
3. DO NOT make up or fabricate any information
4. If something is unclear or not visible, use null
5. Preserve EXACT wording from the document";

/// Message used by the connectivity diagnostic.
pub const PING_MESSAGE: &str = "Hello, world!";
