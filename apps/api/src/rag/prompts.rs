// Prompt constants for grounded résumé Q&A.

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, NOT_MENTIONED_ANSWER};

pub const ANSWER_SYSTEM: &str =
    "You are a helpful HR assistant analyzing a candidate's resume. \
    You only state facts that appear in the resume context you are given.";

/// Assembles the grounded answer prompt.
pub fn build_answer_prompt(
    retrieved_context: &str,
    conversation_history: &str,
    candidate_name: &str,
    total_years: f64,
    skills: &str,
    question: &str,
) -> String {
    format!(
        "You are a helpful HR assistant analyzing a candidate's resume.\n\n\
         Resume Context (Most Relevant Sections):\n{retrieved_context}\n\n\
         {conversation_history}\n\n\
         Additional Information:\n\
         - Candidate Name: {candidate_name}\n\
         - Total Experience: {total_years} years\n\
         - Skills: {skills}\n\n\
         Question: {question}\n\n\
         Instructions:\n{GROUNDING_INSTRUCTION}\n\
         - If information is not in the resume, say \"{NOT_MENTIONED_ANSWER}\"\n\n\
         Answer:"
    )
}
