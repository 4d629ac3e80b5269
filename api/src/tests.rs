//! Router-level tests against an in-process fake GitHub.

use std::{
    collections::HashMap,
    path::{Path as FsPath, PathBuf},
    sync::{Arc, Mutex},
};

use ai_llm_service::{Result as LlmResult, TextGeneration};
use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use fix_applicator::{GitRunner, git_runner::subcommand};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppConfig, AppState, build_router};

const GOOD_TOKEN: &str = "gho_good";

/* ---------------------------------------------------------------------- */
/* Fake GitHub                                                            */
/* ---------------------------------------------------------------------- */

#[derive(Clone, Default)]
struct FakeGitHub {
    requests: Arc<Mutex<Vec<String>>>,
    writes: Arc<Mutex<Vec<Value>>>,
}

impl FakeGitHub {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn log_request(State(gh): State<FakeGitHub>, req: Request<Body>, next: Next) -> Response {
    gh.requests
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {GOOD_TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

fn pr_json(number: u64) -> Value {
    json!({
        "id": 9000 + number, "number": number, "title": "Fix widget rendering", "state": "open",
        "html_url": format!("https://github.com/acme/widgets/pull/{number}"),
        "body": "Renders widgets faster", "user": { "login": "someone", "id": 7 },
        "draft": false, "additions": 1, "deletions": 1, "changed_files": 1,
        "head": { "ref": "fix/42", "sha": "h42",
                  "repo": { "full_name": "someone/widgets-fork" } },
        "base": { "ref": "main", "sha": "b0", "repo": { "full_name": "acme/widgets" } }
    })
}

const DIFF: &str = "diff --git a/src/widget.js b/src/widget.js\n--- a/src/widget.js\n+++ b/src/widget.js\n@@ -1 +1 @@\n-render()\n+renderFast()\n";

async fn fake_github(gh: FakeGitHub) -> String {
    let router = Router::new()
        .route(
            "/login/oauth/access_token",
            post(|Json(body): Json<Value>| async move {
                match body["code"].as_str() {
                    Some("good-code") => {
                        Json(json!({ "access_token": "gho_a+b/c", "token_type": "bearer" }))
                    }
                    Some("silent-code") => Json(json!({ "token_type": "bearer" })),
                    _ => Json(json!({
                        "error": "bad_verification_code",
                        "error_description": "The code passed is incorrect or expired."
                    })),
                }
            }),
        )
        .route(
            "/user",
            get(|headers: HeaderMap| async move {
                if authorized(&headers) {
                    Json(json!({ "login": "octo", "id": 1 })).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        )
        .route(
            "/search/issues",
            get(|| async {
                Json(json!({ "total_count": 6, "items": [{
                    "id": 9042, "number": 42, "title": "Fix widget rendering", "state": "open",
                    "html_url": "https://github.com/acme/widgets/pull/42",
                    "repository_url": "https://api.github.com/repos/acme/widgets"
                }]}))
            }),
        )
        .route(
            "/repos/{owner}/{repo}",
            get(|Path((owner, repo)): Path<(String, String)>| async move {
                if owner == "acme" && repo == "widgets" {
                    Json(json!({ "full_name": "acme/widgets", "private": false,
                                 "default_branch": "main", "permissions": { "push": true } }))
                    .into_response()
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }),
        )
        .route(
            "/repos/{owner}/{repo}/pulls",
            get(|| async { Json(json!([pr_json(42)])) }),
        )
        .route(
            "/repos/{owner}/{repo}/pulls/{number}",
            get(|headers: HeaderMap, Path((_, _, n)): Path<(String, String, u64)>| async move {
                let wants_diff = headers
                    .get(header::ACCEPT)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.contains("diff"));
                if wants_diff {
                    DIFF.into_response()
                } else {
                    Json(pr_json(n)).into_response()
                }
            }),
        )
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(|| async { Json(json!({ "sha": "blob-1" })) }).put(
                |State(gh): State<FakeGitHub>, Json(body): Json<Value>| async move {
                    gh.writes.lock().unwrap().push(body);
                    Json(json!({ "content": { "sha": "blob-2" }, "commit": { "sha": "c1" } }))
                },
            ),
        )
        .layer(middleware::from_fn_with_state(gh.clone(), log_request))
        .with_state(gh);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/* ---------------------------------------------------------------------- */
/* Model and git doubles                                                  */
/* ---------------------------------------------------------------------- */

struct ScriptedModel;

#[async_trait]
impl TextGeneration for ScriptedModel {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> LlmResult<String> {
        Ok(r#"```json
{"analysis":{"summary":"Speeds up rendering","improvements":["Add a test"],"bestPractices":[],"reviewers":["frontend"]},
 "suggestions":{"codeFixes":[{"file":"src/widget.js","description":"Guard null","suggestedCode":"renderFast?.()"}],"generalSuggestions":[]}}
```"#
            .to_string())
    }
}

#[derive(Default)]
struct RecordingGit {
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    /// `(path, content)` of every file passed to `git add`.
    staged: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl GitRunner for RecordingGit {
    async fn run(&self, workdir: &FsPath, args: &[String]) -> fix_applicator::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((workdir.to_path_buf(), args.to_vec()));
        match subcommand(args) {
            "clone" => std::fs::create_dir_all(workdir.join("repo"))?,
            "add" => {
                if let Some(path) = args.last() {
                    let content = std::fs::read_to_string(workdir.join(path))?;
                    self.staged.lock().unwrap().push((path.clone(), content));
                }
            }
            _ => {}
        }
        Ok(String::new())
    }
}

struct Harness {
    app: Router,
    gh: FakeGitHub,
    git: Arc<RecordingGit>,
    work_root: tempfile::TempDir,
}

async fn harness(strategy: &str) -> Harness {
    let gh = FakeGitHub::default();
    let base = fake_github(gh.clone()).await;
    let work_root = tempfile::tempdir().unwrap();

    let vars: HashMap<&str, String> = HashMap::from([
        ("GITHUB_CLIENT_ID", "cid".to_string()),
        ("GITHUB_CLIENT_SECRET", "secret".to_string()),
        ("GITHUB_REDIRECT_URI", "http://localhost:3000/api/github/callback".to_string()),
        ("GITHUB_API_BASE", base.clone()),
        ("GITHUB_OAUTH_BASE", base),
        ("FRONTEND_URL", "http://localhost:5173".to_string()),
        ("LLM_API_KEY", "gsk".to_string()),
        ("FIX_STRATEGY", strategy.to_string()),
        ("FIX_WORK_ROOT", work_root.path().display().to_string()),
    ]);
    let config = AppConfig::from_lookup(&|k: &str| vars.get(k).cloned()).unwrap();

    let git = Arc::new(RecordingGit::default());
    let state = AppState::with_parts(config, Arc::new(ScriptedModel), git.clone()).unwrap();

    Harness {
        app: build_router(state),
        gh,
        git,
        work_root,
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

fn approve_req(token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/github/pr/approve-fix")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn fix_body() -> Value {
    json!({
        "owner": "acme",
        "repo": "widgets",
        "filePath": "src/a.js",
        "newContent": "console.log(1)",
        "pullNumber": 42
    })
}

/* ---------------------------------------------------------------------- */
/* Tests                                                                  */
/* ---------------------------------------------------------------------- */

#[tokio::test]
async fn health_and_request_id() {
    let h = harness("direct").await;
    let (status, headers, body) = call(&h.app, get_req("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn login_redirects_to_authorize() {
    let h = harness("direct").await;
    let res = h
        .app
        .clone()
        .oneshot(get_req("/api/github/login", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.contains("/login/oauth/authorize?client_id=cid"));
    assert!(location.ends_with("scope=repo"));
}

#[tokio::test]
async fn callback_without_code_is_bad_request() {
    let h = harness("direct").await;
    let (status, _, body) = call(&h.app, get_req("/api/github/callback", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code not provided");
}

#[tokio::test]
async fn callback_redirects_token_to_frontend() {
    let h = harness("direct").await;
    let res = h
        .app
        .clone()
        .oneshot(get_req("/api/github/callback?code=good-code", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()[header::LOCATION],
        "http://localhost:5173/auth/callback?token=gho_a%2Bb%2Fc"
    );
    assert_eq!(h.gh.requests(), ["POST /login/oauth/access_token"]);
}

#[tokio::test]
async fn callback_reports_failed_exchange() {
    let h = harness("direct").await;
    let (status, _, body) =
        call(&h.app, get_req("/api/github/callback?code=stale-code", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bad_verification_code"));
    assert_eq!(body["details"], "The code passed is incorrect or expired.");

    let (status, _, body) =
        call(&h.app, get_req("/api/github/callback?code=silent-code", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "GitHub returned no access token");
}

#[tokio::test]
async fn verify_mirrors_upstream_status() {
    let h = harness("direct").await;
    let (status, _, body) = call(&h.app, get_req("/api/github/verify?token=nope", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let uri = format!("/api/github/verify?token={GOOD_TOKEN}");
    let (status, _, body) = call(&h.app, get_req(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["userData"]["login"], "octo");
}

#[tokio::test]
async fn user_prs_require_token_and_paginate() {
    let h = harness("direct").await;
    let (status, _, body) = call(&h.app, get_req("/api/github/prs/user", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    let (status, _, body) = call(
        &h.app,
        get_req("/api/github/prs/user?page=1&per_page=5", Some(GOOD_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 6);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["data"][0]["repository"], "acme/widgets");
    assert_eq!(body["data"][0]["head_ref"], "fix/42");
}

#[tokio::test]
async fn bad_query_is_mapped_to_json_error() {
    let h = harness("direct").await;
    let (status, headers, body) = call(
        &h.app,
        get_req("/api/github/prs/user?page=abc", Some(GOOD_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn repo_prs_are_listed() {
    let h = harness("direct").await;
    let (status, _, body) = call(
        &h.app,
        get_req("/api/github/prs/acme/widgets", Some(GOOD_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["number"], 42);
}

#[tokio::test]
async fn pr_detail_carries_diff_and_analysis() {
    let h = harness("direct").await;
    let (status, _, body) = call(
        &h.app,
        get_req("/api/github/pr/42/acme/widgets", Some(GOOD_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number"], 42);
    assert_eq!(body["head"]["ref"], "fix/42");
    assert!(body["diff"].as_str().unwrap().starts_with("diff --git"));
    assert_eq!(body["analysis"]["analysis"]["summary"], "Speeds up rendering");
    assert_eq!(
        body["analysis"]["suggestions"]["codeFixes"][0]["suggestedCode"],
        "renderFast?.()"
    );
}

#[tokio::test]
async fn approve_fix_missing_field_makes_no_github_call() {
    let h = harness("branch").await;
    let mut body = fix_body();
    body.as_object_mut().unwrap().remove("filePath");

    let (status, _, resp) = call(&h.app, approve_req(GOOD_TOKEN, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Missing required fields");
    assert_eq!(resp["details"], "filePath");
    assert!(h.gh.requests().is_empty());
    assert!(h.git.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn approve_fix_requires_valid_identity() {
    let h = harness("branch").await;
    let (status, _, _) = call(&h.app, approve_req("gho_expired", fix_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.gh.requests(), ["GET /user"]);
}

#[tokio::test]
async fn approve_fix_without_repo_access_is_forbidden() {
    let h = harness("direct").await;
    let mut body = fix_body();
    body["repo"] = json!("secret");

    let (status, _, resp) = call(&h.app, approve_req(GOOD_TOKEN, body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(resp["error"].as_str().unwrap().contains("access"));
    assert!(h.gh.writes.lock().unwrap().is_empty());
    assert!(!h.gh.requests().iter().any(|r| r.starts_with("PUT")));
}

#[tokio::test]
async fn approve_fix_lands_on_fork_head_branch() {
    let h = harness("branch").await;
    let (status, _, resp) = call(&h.app, approve_req(GOOD_TOKEN, fix_body())).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(resp["message"], "Fix approved successfully");

    let calls = h.git.calls.lock().unwrap();
    let clone = &calls[0].1;
    assert_eq!(subcommand(clone), "clone");
    assert!(clone.iter().any(|a| a.ends_with("/someone/widgets-fork.git")));
    assert_eq!(calls[1].1, ["checkout", "fix/42"]);
    assert_eq!(calls.last().unwrap().1, ["push", "origin", "fix/42"]);
    let commit = calls.iter().find(|(_, a)| subcommand(a) == "commit").unwrap();
    assert!(commit.1.last().unwrap().contains("src/a.js"));
    drop(calls);

    assert_eq!(
        *h.git.staged.lock().unwrap(),
        [("src/a.js".to_string(), "console.log(1)".to_string())]
    );
    let leftovers = std::fs::read_dir(h.work_root.path()).unwrap().count();
    assert_eq!(leftovers, 0, "scratch clone was not removed");

    // nothing went through the contents API or to the default branch
    assert!(h.gh.writes.lock().unwrap().is_empty());
    assert!(
        h.gh.requests()
            .iter()
            .any(|r| r == "GET /repos/acme/widgets/pulls/42")
    );
}

#[tokio::test]
async fn approve_fix_direct_strategy_writes_contents() {
    let h = harness("direct").await;
    let (status, _, _) = call(&h.app, approve_req(GOOD_TOKEN, fix_body())).await;
    assert_eq!(status, StatusCode::OK);

    let writes = h.gh.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["sha"], "blob-1");
    assert_eq!(writes[0]["message"], "Apply suggested fix to src/a.js");
    assert!(writes[0].get("branch").is_none());
    assert!(h.git.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let h = harness("direct").await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/github/pr/approve-fix")
        .header(header::AUTHORIZATION, format!("Bearer {GOOD_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = call(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
    assert!(h.gh.requests().is_empty());
}
