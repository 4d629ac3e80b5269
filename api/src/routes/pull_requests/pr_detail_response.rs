use git_context_engine::types::{BranchRef, PullRequest, PullRequestSummary};
use pr_reviewer::PrAnalysis;
use serde::Serialize;

/// PR metadata with its full diff and the model's analysis.
///
/// `analysis` nests `{analysis, suggestions}` as the web client reads it.
#[derive(Debug, Serialize)]
pub struct PullRequestDetail {
    #[serde(flatten)]
    pub summary: PullRequestSummary,
    pub body: Option<String>,
    pub head: BranchRef,
    pub base: BranchRef,
    pub diff: String,
    pub analysis: PrAnalysis,
}

impl PullRequestDetail {
    pub fn new(pr: PullRequest, diff: String, analysis: PrAnalysis) -> Self {
        Self {
            summary: pr.summary,
            body: pr.body,
            head: pr.head,
            base: pr.base,
            diff,
            analysis,
        }
    }
}
