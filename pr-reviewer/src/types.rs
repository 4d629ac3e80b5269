//! Analysis schema returned by the model and exposed over HTTP.
//!
//! Field names are camelCase on the wire. Deserialization is strict: every
//! key must be present with the right type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub summary: String,
    pub improvements: Vec<String>,
    pub best_practices: Vec<String>,
    pub reviewers: Vec<String>,
}

/// A suggested replacement for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFix {
    pub file: String,
    pub description: String,
    pub suggested_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    pub code_fixes: Vec<CodeFix>,
    pub general_suggestions: Vec<String>,
}

/// Analysis plus suggestions; always well formed when returned by `analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrAnalysis {
    pub analysis: Analysis,
    pub suggestions: Suggestions,
}

impl PrAnalysis {
    /// Empty analysis carrying only a summary.
    pub fn fallback(summary: &str) -> Self {
        Self {
            analysis: Analysis {
                summary: summary.to_string(),
                improvements: Vec::new(),
                best_practices: Vec::new(),
                reviewers: Vec::new(),
            },
            suggestions: Suggestions {
                code_fixes: Vec::new(),
                general_suggestions: Vec::new(),
            },
        }
    }
}
