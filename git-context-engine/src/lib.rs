mod errors;
pub mod git_providers;
pub mod oauth;
pub mod parser;

pub use errors::{
    GitContextEngineError, GitContextEngineOAuthError, GitContextEngineProviderError,
    GitContextEngineResult,
};
pub use git_providers::{GitHubClient, types};
pub use oauth::OAuthApp;
pub use parser::truncate_diff;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::git_providers::types::{Pagination, PullRequestSummary, UserPullRequestPage};

/// Upper bound GitHub accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// Lists PRs authored by the token's user, enriched with head/base refs and
/// change stats.
///
/// `page` is clamped to at least 1 and `per_page` to `1..=100`. Items are
/// enriched concurrently; an item whose enrichment fails keeps its search
/// shape instead of failing the whole page.
pub async fn list_user_pull_requests(
    client: &GitHubClient,
    page: u32,
    per_page: u32,
) -> GitContextEngineResult<UserPullRequestPage> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PER_PAGE);

    let search = client.search_user_pull_requests(page, per_page).await?;
    debug!(
        page,
        per_page,
        total = search.total,
        items = search.items.len(),
        "user PR search page fetched"
    );

    let items = join_all(search.items.into_iter().map(|item| enrich(client, item))).await;

    info!(page, count = items.len(), total = search.total, "user PRs listed");
    Ok(UserPullRequestPage {
        items,
        pagination: Pagination::new(page, per_page, search.total),
    })
}

async fn enrich(client: &GitHubClient, mut item: PullRequestSummary) -> PullRequestSummary {
    if item.repository_owner.is_empty() || item.repository_name.is_empty() {
        return item;
    }

    match client
        .get_pull_request(&item.repository_owner, &item.repository_name, item.number)
        .await
    {
        Ok(full) => {
            item.enrichment = full.summary.enrichment;
            item
        }
        Err(e) => {
            warn!(
                repository = %item.repository,
                number = item.number,
                error = %e,
                "PR enrichment failed; keeping search result"
            );
            item
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn search_item(number: u64) -> serde_json::Value {
        json!({
            "id": number, "number": number, "title": format!("PR {number}"), "state": "open",
            "html_url": format!("https://github.com/acme/widgets/pull/{number}"),
            "repository_url": "https://api.github.com/repos/acme/widgets"
        })
    }

    fn fake_github(seen_per_page: Arc<Mutex<Option<String>>>) -> Router {
        Router::new()
            .route("/user", get(|| async { Json(json!({ "login": "octo", "id": 1 })) }))
            .route(
                "/search/issues",
                get(move |Query(q): Query<HashMap<String, String>>| {
                    let seen = seen_per_page.clone();
                    async move {
                        *seen.lock().unwrap() = q.get("per_page").cloned();
                        Json(json!({
                            "total_count": 12,
                            "items": [search_item(1), search_item(2)]
                        }))
                    }
                }),
            )
            .route(
                "/repos/{owner}/{repo}/pulls/{number}",
                get(|Path((_, _, n)): Path<(String, String, u64)>| async move {
                    if n == 2 {
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    Json(json!({
                        "id": n, "number": n, "title": "PR", "state": "open",
                        "html_url": "https://github.com/acme/widgets/pull/1",
                        "additions": 4, "deletions": 2, "changed_files": 1,
                        "head": { "ref": "feature", "sha": "h" },
                        "base": { "ref": "main", "sha": "b" }
                    }))
                    .into_response()
                }),
            )
    }

    #[tokio::test]
    async fn lists_enriches_and_paginates() {
        let seen = Arc::new(Mutex::new(None));
        let base = serve(fake_github(seen.clone())).await;
        let client = GitHubClient::new(reqwest::Client::new(), base, "tok");

        let page = list_user_pull_requests(&client, 1, 5).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);

        let first = page.items[0].enrichment.as_ref().unwrap();
        assert_eq!(first.head_ref, "feature");
        assert_eq!(first.additions, Some(4));
        // enrichment failure degrades to the search shape
        assert!(page.items[1].enrichment.is_none());
    }

    #[tokio::test]
    async fn page_arguments_are_clamped() {
        let seen = Arc::new(Mutex::new(None));
        let base = serve(fake_github(seen.clone())).await;
        let client = GitHubClient::new(reqwest::Client::new(), base, "tok");

        let page = list_user_pull_requests(&client, 0, 500).await.unwrap();
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.per_page, MAX_PER_PAGE);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("100"));
    }
}
