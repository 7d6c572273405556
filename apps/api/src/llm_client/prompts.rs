// Prompt constants for the resume suggestion call.

pub const SUGGESTION_SYSTEM: &str =
    "You are a helpful assistant that suggests improvements for resumes.";

/// Placeholders: `{user_name}`, `{resume_text}`.
pub const SUGGESTION_PROMPT_TEMPLATE: &str =
    "The following resume belongs to {user_name}. Please suggest improvements:\n{resume_text}";

pub fn build_suggestion_prompt(resume_text: &str, user_name: &str) -> String {
    SUGGESTION_PROMPT_TEMPLATE
        .replace("{user_name}", user_name)
        .replace("{resume_text}", resume_text)
}
