// Prompt text for resume optimization.

/// System prompt for optimization. Enforces JSON-only output.
pub const OPTIMIZE_SYSTEM: &str = "You are an expert resume writer and ATS specialist. \
    You rewrite resume content to be clearer, more specific, and more impactful \
    without inventing experience the candidate does not have. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Optimization prompt template. Replace `{resume_json}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"Optimize the following resume data for ATS compatibility and impact.

Rules:
- Keep the EXACT same JSON structure, field names, and entry ids.
- Rewrite descriptions and highlights with strong action verbs and quantified outcomes where the source supports them.
- Do NOT add employers, degrees, dates, or skills that are not present in the input.
- Leave empty fields empty.

Resume data:
{resume_json}"#;

pub fn build_optimize_prompt(resume_json: &str) -> String {
    OPTIMIZE_PROMPT_TEMPLATE.replace("{resume_json}", resume_json)
}
