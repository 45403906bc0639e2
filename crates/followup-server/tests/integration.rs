use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use followup_core::engine::Engine;
use followup_core::index::TantivyIndex;
use followup_core::llm::{Answerer, Extractor};
use followup_core::store::CommitmentStore;
use followup_core::types::{CommitmentDraft, Priority};
use followup_core::Result;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extractor fake that returns the same drafts for any transcript.
struct FixedExtractor(Vec<CommitmentDraft>);

impl Extractor for FixedExtractor {
    fn extract(&self, _transcript: &str) -> Result<Vec<CommitmentDraft>> {
        Ok(self.0.clone())
    }
}

/// Answerer fake that echoes the question and context.
struct EchoAnswerer;

impl Answerer for EchoAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<String> {
        Ok(format!("Q: {question} | CONTEXT: {context}"))
    }
}

fn draft(task: &str, owner: Option<&str>, deadline: Option<&str>, vague: bool) -> CommitmentDraft {
    CommitmentDraft {
        task: task.into(),
        owner: owner.map(String::from),
        deadline: deadline.map(String::from),
        priority: Priority::Medium,
        is_vague: vague,
    }
}

/// Build a router over in-memory stores with the given extraction result.
fn app(drafts: Vec<CommitmentDraft>) -> axum::Router {
    let engine = Engine::new(
        CommitmentStore::open_in_memory().unwrap(),
        Box::new(TantivyIndex::open_in_ram().unwrap()),
        Box::new(FixedExtractor(drafts)),
        Box::new(EchoAnswerer),
    );
    followup_server::build_router(engine)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn ingest_body(title: &str) -> serde_json::Value {
    serde_json::json!({ "meeting_title": title, "content": "transcript text" })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_returns_service_banner() {
    let (status, json) = get(app(vec![]), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["service"], "followup");
    assert_eq!(json["status"], "running");
}

#[tokio::test]
async fn ingest_returns_batch_with_flags_and_score() {
    let app = app(vec![
        draft("Publish the release notes", None, Some("Friday"), false),
        draft("Tidy up the onboarding flow", Some("priya"), None, true),
        draft("Ship the billing fix", Some("marco"), Some("Tuesday"), false),
    ]);

    let (status, json) = post_json(app, "/api/ingest", ingest_body("Weekly sync")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meeting_title"], "Weekly sync");
    assert_eq!(json["extracted_count"], 3);
    assert_eq!(json["commitments"].as_array().unwrap().len(), 3);
    assert_eq!(json["health_score"], 67);
    assert_eq!(json["health_label"], "At Risk");

    let kinds: Vec<&str> = json["risk_flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["type"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"no_owner"));
    assert!(kinds.contains(&"no_deadline"));
    assert!(kinds.contains(&"vague_commitment"));
}

#[tokio::test]
async fn ingest_with_no_extracted_commitments_is_400() {
    let (status, json) = post_json(app(vec![]), "/api/ingest", ingest_body("Quiet sync")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn commitments_listing_supports_owner_filter() {
    let app = app(vec![
        draft("Task for priya", Some("priya"), Some("Friday"), false),
        draft("Task for marco", Some("marco"), Some("Monday"), false),
    ]);
    let (status, _) = post_json(app.clone(), "/api/ingest", ingest_body("Weekly sync")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(app.clone(), "/api/commitments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);

    let (status, json) = get(app, "/api/commitments?owner=priya").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["commitments"][0]["owner"], "priya");
}

#[tokio::test]
async fn health_score_reflects_whole_store() {
    let app = app(vec![draft("Publish the release notes", None, Some("Friday"), false)]);
    post_json(app.clone(), "/api/ingest", ingest_body("Weekly sync")).await;

    let (status, json) = get(app, "/api/health-score").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_commitments"], 1);
    assert_eq!(json["total_risks"], 1);
    assert_eq!(json["health_score"], 85);
    assert_eq!(json["health_label"], "Healthy");
}

#[tokio::test]
async fn empty_store_is_perfectly_healthy() {
    let (status, json) = get(app(vec![]), "/api/health-score").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_commitments"], 0);
    assert_eq!(json["health_score"], 100);
    assert_eq!(json["health_label"], "Healthy");
}

#[tokio::test]
async fn risks_lists_every_current_flag() {
    let app = app(vec![draft("Handle the thing", None, None, true)]);
    post_json(app.clone(), "/api/ingest", ingest_body("Weekly sync")).await;

    let (status, json) = get(app, "/api/risks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_risks"], 3);
    assert_eq!(json["risks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn query_with_empty_memory_returns_sentinel_answer() {
    let (status, json) = post_json(
        app(vec![]),
        "/api/query",
        serde_json::json!({ "question": "what did priya commit to?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["question"], "what did priya commit to?");
    assert_eq!(json["answer"], "No relevant commitments found in memory.");
}

#[tokio::test]
async fn query_hands_retrieved_context_to_answerer() {
    let app = app(vec![draft(
        "Update the API documentation",
        Some("priya"),
        Some("Friday"),
        false,
    )]);
    post_json(app.clone(), "/api/ingest", ingest_body("Weekly sync")).await;

    let (status, json) = post_json(
        app,
        "/api/query",
        serde_json::json!({ "question": "who owns the API documentation?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let answer = json["answer"].as_str().unwrap();
    assert!(answer.contains("who owns the API documentation?"));
    assert!(answer.contains("Update the API documentation"));
    assert!(answer.contains("Owner: priya"));
}

#[tokio::test]
async fn disk_backed_stores_survive_router_rebuild() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("commitments.db");
    let idx = dir.path().join("index");

    let build = |drafts: Vec<CommitmentDraft>| {
        let engine = Engine::new(
            CommitmentStore::open(&db).unwrap(),
            Box::new(TantivyIndex::open(&idx).unwrap()),
            Box::new(FixedExtractor(drafts)),
            Box::new(EchoAnswerer),
        );
        followup_server::build_router(engine)
    };

    {
        let app = build(vec![draft("Ship the beta", Some("priya"), Some("Friday"), false)]);
        let (status, _) = post_json(app, "/api/ingest", ingest_body("Weekly sync")).await;
        assert_eq!(status, StatusCode::OK);
    }

    // A fresh router over the same files sees the ingested commitment.
    let app = build(vec![]);
    let (status, json) = get(app.clone(), "/api/commitments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["commitments"][0]["task"], "Ship the beta");

    let (status, json) = post_json(
        app,
        "/api/query",
        serde_json::json!({ "question": "who ships the beta?" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["answer"].as_str().unwrap().contains("Ship the beta"));
}

#[tokio::test]
async fn reconcile_on_consistent_stores_reports_zeros() {
    let app = app(vec![draft("Ship the beta", Some("priya"), Some("Friday"), false)]);
    post_json(app.clone(), "/api/ingest", ingest_body("Weekly sync")).await;

    let (status, json) = post_json(app, "/api/reconcile", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reindexed"], 0);
    assert_eq!(json["removed"], 0);
}
