//! Prompt construction.

/// Characters of the PR description forwarded to the model.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const NO_DESCRIPTION: &str = "No description provided";

const SCHEMA: &str = r#"{
  "analysis": {
    "summary": "1-2 sentence overview",
    "improvements": ["max 2 key improvements"],
    "bestPractices": ["max 2 best practices"],
    "reviewers": ["max 2 reviewer types"]
  },
  "suggestions": {
    "codeFixes": [
      {
        "file": "file path",
        "description": "brief description",
        "suggestedCode": "short fix"
      }
    ],
    "generalSuggestions": ["max 2 suggestions"]
  }
}"#;

/// Cuts the description to [`MAX_DESCRIPTION_CHARS`] characters (not bytes).
pub fn shorten_description(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        None => NO_DESCRIPTION.to_string(),
    }
}

/// Builds the single user prompt. `diff` must already be truncated.
pub fn build_prompt(title: &str, description: &str, diff: &str) -> String {
    format!(
        "Analyze this Pull Request briefly. Return your response in this exact JSON format:\n\
         {SCHEMA}\n\n\
         PR Details:\n\
         Title: {title}\n\
         Description: {description}\n\
         Changes: {diff}\n\n\
         Keep everything very brief and focused on the most important points only. \
         Return only the JSON object."
    )
}
