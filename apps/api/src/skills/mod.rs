pub mod candidate_info;
pub mod extractor;
pub mod prompts;

pub use candidate_info::{
    CandidateInfoExtractor, LlmCandidateInfoExtractor, RegexCandidateInfoExtractor,
};
pub use extractor::SkillExtractor;
