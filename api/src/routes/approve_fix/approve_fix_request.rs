use fix_applicator::{FixRequest, FixStrategy};
use serde::Deserialize;

/// Body of `POST /pr/approve-fix`.
///
/// Fields are optional so a missing one yields a 400 naming it instead of a
/// generic deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveFixRequest {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub file_path: Option<String>,
    pub new_content: Option<String>,
    pub pull_number: Option<u64>,
}

impl ApproveFixRequest {
    /// Converts into a [`FixRequest`], or lists the missing field names.
    pub fn into_fix_request(self, strategy: FixStrategy) -> Result<FixRequest, Vec<&'static str>> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        let owner = present(self.owner);
        let repo = present(self.repo);
        let file_path = present(self.file_path);
        let new_content = present(self.new_content);

        let mut missing = Vec::new();
        if owner.is_none() {
            missing.push("owner");
        }
        if repo.is_none() {
            missing.push("repo");
        }
        if file_path.is_none() {
            missing.push("filePath");
        }
        if new_content.is_none() {
            missing.push("newContent");
        }
        if strategy == FixStrategy::Branch && self.pull_number.is_none() {
            missing.push("pullNumber");
        }

        match (owner, repo, file_path, new_content) {
            (Some(owner), Some(repo), Some(file_path), Some(new_content)) if missing.is_empty() => {
                Ok(FixRequest {
                    owner: owner.trim().to_string(),
                    repo: repo.trim().to_string(),
                    file_path: file_path.trim().to_string(),
                    new_content,
                    pull_number: self.pull_number,
                })
            }
            _ => Err(missing),
        }
    }
}
