// All LLM prompt constants for the skills module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for skill extraction. Output is a plain comma-separated list, not JSON.
pub const SKILL_EXTRACTION_SYSTEM: &str =
    "You are an expert technical recruiter analyzing resumes and job descriptions. \
    Respond with a single comma-separated list of skills and nothing else.";

/// Skill extraction prompt. Replace `{text}` before sending.
pub const SKILL_EXTRACTION_PROMPT: &str = r#"Extract ALL relevant technical and professional skills from the text below.

Include these categories:
- Programming Languages: JavaScript, Python, Java, C++, etc.
- Frameworks: React, Angular, Django, Spring, etc.
- Tools: Docker, Git, Jenkins, Kubernetes, etc.
- Databases: MongoDB, PostgreSQL, MySQL, Redis, etc.
- Cloud: AWS, Azure, GCP, etc.
- Other: AI/ML, DevOps, Agile, etc.

IMPORTANT RULES:
1. Return ONLY a comma-separated list
2. Each skill should be 1-3 words
3. Standardize names: "ReactJS" → "React", "NodeJS" → "Node.js"
4. No explanations, no numbers, no extra text
5. Maximum 40 skills

Text:
{text}

Skills (comma-separated only):"#;

/// Candidate info prompt. Replace `{resume_text}` before sending.
pub const CANDIDATE_INFO_PROMPT: &str = r#"Extract candidate information from this resume.

Resume:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Full Name",
  "email": "email@example.com",
  "phone": "+1234567890",
  "experience": {
    "totalYears": 5,
    "details": "Brief summary"
  },
  "education": [
    {
      "degree": "B.Tech Computer Science",
      "institution": "University Name",
      "year": "2020"
    }
  ],
  "summary": "Professional summary"
}

If information is not found, use null."#;
