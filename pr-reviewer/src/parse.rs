//! Turning raw model text into a [`PrAnalysis`].

use tracing::{debug, warn};

use crate::types::PrAnalysis;

/// Entries kept per free-text list.
pub const MAX_LIST_ITEMS: usize = 2;

/// Strips a surrounding markdown code fence (```json ... ``` or ``` ... ```).
pub fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

/// Outermost `{ ... }` slice, for answers wrapped in prose.
fn outer_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Parses and normalizes a model answer; `None` when it does not match the schema.
pub fn parse_analysis(raw: &str) -> Option<PrAnalysis> {
    let cleaned = cleanup_json_like(raw);

    let parsed = match serde_json::from_str::<PrAnalysis>(&cleaned) {
        Ok(v) => v,
        Err(first) => {
            let slice = outer_object(&cleaned)?;
            match serde_json::from_str::<PrAnalysis>(slice) {
                Ok(v) => {
                    debug!("analysis recovered from embedded JSON object");
                    v
                }
                Err(_) => {
                    warn!(error = %first, "model answer does not match analysis schema");
                    return None;
                }
            }
        }
    };

    Some(normalize(parsed))
}

fn normalize(mut a: PrAnalysis) -> PrAnalysis {
    a.analysis.improvements.truncate(MAX_LIST_ITEMS);
    a.analysis.best_practices.truncate(MAX_LIST_ITEMS);
    a.analysis.reviewers.truncate(MAX_LIST_ITEMS);
    a.suggestions.general_suggestions.truncate(MAX_LIST_ITEMS);
    a.suggestions
        .code_fixes
        .retain(|fix| !fix.file.trim().is_empty());
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "analysis": {"summary": "Adds a cache", "improvements": ["a","b","c"],
                     "bestPractices": [], "reviewers": ["backend"]},
        "suggestions": {"codeFixes": [
            {"file": "src/a.rs", "description": "d", "suggestedCode": "fn a() {}"},
            {"file": "  ", "description": "d", "suggestedCode": "x"}
        ], "generalSuggestions": ["g"]}
    }"#;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(cleanup_json_like("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(cleanup_json_like("```\n{}\n```"), "{}");
        assert_eq!(cleanup_json_like("  {} "), "{}");
    }

    #[test]
    fn valid_answer_is_normalized() {
        let a = parse_analysis(VALID).unwrap();
        assert_eq!(a.analysis.summary, "Adds a cache");
        assert_eq!(a.analysis.improvements, vec!["a", "b"]);
        assert_eq!(a.suggestions.code_fixes.len(), 1);
        assert_eq!(a.suggestions.code_fixes[0].suggested_code, "fn a() {}");
    }

    #[test]
    fn fenced_and_prose_wrapped_answers_parse() {
        assert!(parse_analysis(&format!("```json\n{VALID}\n```")).is_some());
        assert!(parse_analysis(&format!("Here you go:\n{VALID}\nHope it helps")).is_some());
    }

    #[test]
    fn schema_mismatch_is_rejected() {
        assert!(parse_analysis("not json").is_none());
        assert!(parse_analysis(r#"{"analysis": {"summary": "x"}}"#).is_none());
        assert!(
            parse_analysis(
                r#"{"analysis": {"summary": 3, "improvements": [], "bestPractices": [], "reviewers": []},
                    "suggestions": {"codeFixes": [], "generalSuggestions": []}}"#
            )
            .is_none()
        );
    }
}
