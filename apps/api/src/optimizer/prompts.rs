// Prompt templates for the optimizer and the ATS scan.
// Inputs are spliced in verbatim, once. Nothing in the resume or the job
// description is ever treated as a placeholder.

/// Exact instruction that keeps the model from fencing its Markdown.
pub const NO_CODE_FENCE_INSTRUCTION: &str = "Do NOT wrap the output in ``` or ```markdown.";

/// Exact instruction that restricts the ATS scan to a JSON document.
pub const JSON_ONLY_INSTRUCTION: &str = "Output ONLY valid JSON.";

const REWRITE_INSTRUCTIONS: &str = r#"Your objective is to produce a professional, one-page, compelling resume tailored to the job description below, maximizing the candidate's interview chances through strong content, keyword alignment, measurable achievements and clean formatting.

If a tool, framework or skill in the resume does not appear in the job description but a closely related one does, replace it with the job description's keyword. For example, if the resume mentions Tableau and the job asks for PowerBI, write PowerBI. Be ethical: don't replace it if the substitution is not logical.

Guidelines to follow:

Keyword and skill optimization:
- Identify the relevant hard and soft skills in the job description.
- Match at least 80% of the job description's keywords so the resume passes applicant tracking systems (ATS).
- Feature industry-relevant hard and soft skills in dedicated sections and throughout the bullet points.

Measurable metrics:
- Quantify achievements with the XYZ formula: "Accomplished X, measured by Y, by doing Z".
- Include at least five measurable results that clearly demonstrate impact.
- Replace vague statements with metrics that show value and effectiveness.

Length and structure:
- Keep the resume between 400 and 500 words.
- Keep a clean, organized structure with clear headings and bullet points.
- Roles that customarily need longer resumes (academia, federal jobs, C-suite) are the exception and may run longer.

Content and language:
- Remove buzzwords, cliches and first-person pronouns ("I", "me", "my").
- Use action-oriented language that emphasizes accomplishments over duties.
- Replace generic phrases with specific examples of expertise and success.
- Sell experience, skills and results instead of summarizing past roles.

Additional instructions:
- Tailor each section (Professional Summary, Experience, Skills, Education) to the role.
- Keep formatting consistent and use whitespace deliberately.
- Write concise bullet points that each start with a strong action verb.
"#;

const REWRITE_OUTPUT_RULES: &str = "Generate the resume in Markdown so it can be written to a PDF file. \
Return only the resume content and nothing else. Return raw Markdown only.";

const SCORING_INTRO: &str = "You are a professional Applicant Tracking System (ATS) resume scanner similar to Jobscan.
Your task is to analyze a resume against a job description and produce a Jobscan-style match report.
Output ONLY valid JSON. Do NOT wrap the JSON in quotes or code fences.
";

const SCORING_INSTRUCTIONS: &str = r#"ANALYSIS INSTRUCTIONS
Evaluate the resume with ATS logic based on:
- Hard skills match
- Soft skills match
- Keyword alignment
- Job title and role relevance
- Tools, technologies and frameworks
- Experience relevance
- Resume searchability (ATS readability)

Be strict, realistic and recruiter-focused.
Do NOT assume or hallucinate skills or experience that are not explicitly stated in the resume.

SCORING
- Compute a match rate between 0 and 100.
- Weighting:
  - Hard skills & keywords: 45%
  - Experience & role alignment: 30%
  - Tools & technologies: 15%
  - Searchability & formatting: 10%

OUTPUT RULES (MANDATORY)
- Output ONLY valid JSON.
- No explanations, no markdown, no extra text.
- The JSON must follow this schema exactly:

{
  "match_rate": <integer 0-100>,
  "match_level": "<Poor | Fair | Good | Strong | Excellent>",
  "hard_skills": {"matched": ["<skill>"], "missing": ["<skill>"]},
  "soft_skills": {"matched": ["<skill>"], "missing": ["<skill>"]},
  "keywords": {"matched": ["<keyword>"], "missing": ["<keyword>"]},
  "tools_and_technologies": {"matched": ["<tool>"], "missing": ["<tool>"]},
  "experience": {
    "job_requirement": "<years or description from the job description>",
    "resume_experience": "<estimated from the resume>",
    "match_status": "<Low | Partial | Strong>"
  },
  "job_title_match": {
    "job_title_in_jd": "<title>",
    "resume_titles": ["<title>"],
    "match_status": "<Low | Partial | Strong>"
  },
  "searchability": {
    "score": <integer 0-100>,
    "issues": ["<missing section headers, poor keyword placement, non-ATS-friendly formatting>"]
  },
  "recruiter_tips": ["<actionable improvement>"]
}
"#;

/// Builds the resume rewrite prompt. Pure: the inputs appear verbatim.
pub fn build_rewrite_prompt(resume_text: &str, jd_text: &str) -> String {
    let mut prompt = String::with_capacity(
        REWRITE_INSTRUCTIONS.len() + resume_text.len() + jd_text.len() + 512,
    );
    prompt.push_str(REWRITE_INSTRUCTIONS);
    prompt.push_str("\nMy Resume:\n");
    prompt.push_str(resume_text);
    prompt.push_str("\n\nJob Description:\n");
    prompt.push_str(jd_text);
    prompt.push_str("\n\n");
    prompt.push_str(REWRITE_OUTPUT_RULES);
    prompt.push('\n');
    prompt.push_str(NO_CODE_FENCE_INSTRUCTION);
    prompt.push('\n');
    prompt
}

/// Builds the ATS scoring prompt. Pure: the inputs appear verbatim.
pub fn build_scoring_prompt(resume_text: &str, jd_text: &str) -> String {
    let mut prompt = String::with_capacity(
        SCORING_INTRO.len() + SCORING_INSTRUCTIONS.len() + resume_text.len() + jd_text.len() + 64,
    );
    prompt.push_str(SCORING_INTRO);
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt.push_str("\n\nINPUTS\nResume:\n");
    prompt.push_str(resume_text);
    prompt.push_str("\n\nJob Description:\n");
    prompt.push_str(jd_text);
    prompt.push_str("\n\n");
    prompt.push_str(SCORING_INSTRUCTIONS);
    prompt
}
