// Shared prompt constants and prompt-building utilities.
// Each component that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Sentence the model must use when the résumé does not contain the answer.
pub const NOT_MENTIONED_ANSWER: &str = "This information is not mentioned in the resume";

/// Common instruction appended to every answer-generation prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
- Answer based ONLY on the resume information provided
- Be specific and cite details from the resume
- Be professional and concise";
