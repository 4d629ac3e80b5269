//! PR analyzer.
//!
//! Builds a fixed-shape prompt from title, description and a truncated diff,
//! calls the model once, and always returns a well-formed [`PrAnalysis`]:
//! unparseable answers degrade to a fallback instead of an error.

pub mod errors;
pub mod parse;
pub mod prompt;
pub mod types;

use std::time::Instant;

use ai_llm_service::TextGeneration;
use git_context_engine::truncate_diff;
use tracing::{debug, info, warn};

pub use errors::{ReviewError, ReviewResult};
pub use types::{Analysis, CodeFix, PrAnalysis, Suggestions};

/// Summary used when the model answers with no content.
pub const NO_RESPONSE_SUMMARY: &str = "No response from AI";
/// Summary used when the answer cannot be parsed into the schema.
pub const PARSE_FAILURE_SUMMARY: &str = "Failed to parse analysis";

/// Analyzes one pull request.
///
/// Model transport failures are returned as errors; everything after a
/// successful call degrades to a fallback analysis.
pub async fn analyze(
    model: &dyn TextGeneration,
    title: &str,
    description: Option<&str>,
    diff: &str,
) -> ReviewResult<PrAnalysis> {
    let t0 = Instant::now();
    let description = prompt::shorten_description(description);
    let diff = truncate_diff(diff);
    let prompt = prompt::build_prompt(title, &description, &diff);
    debug!(prompt_chars = prompt.len(), diff_chars = diff.len(), "analysis prompt built");

    let raw = match model.generate(&prompt, None).await {
        Ok(text) => text,
        Err(e) if e.is_empty_response() => {
            warn!("model returned no choices");
            return Ok(PrAnalysis::fallback(NO_RESPONSE_SUMMARY));
        }
        Err(e) => return Err(e.into()),
    };

    if raw.trim().is_empty() {
        warn!("model returned empty text");
        return Ok(PrAnalysis::fallback(NO_RESPONSE_SUMMARY));
    }

    let out = parse::parse_analysis(&raw).unwrap_or_else(|| {
        warn!(raw_chars = raw.len(), "falling back to empty analysis");
        PrAnalysis::fallback(PARSE_FAILURE_SUMMARY)
    });

    info!(
        fixes = out.suggestions.code_fixes.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "PR analyzed"
    );
    Ok(out)
}
