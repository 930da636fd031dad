use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use eduverify_governance::GovernanceEngine;
use eduverify_ledger::MemoryContentStore;
use eduverify_rpc::{router, AppState};
use eduverify_types::Identity;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const LIMIT: usize = 1024;

fn id(byte: u8) -> Identity {
    Identity::new([byte; 20])
}

fn app(governors: &[u8], institutions: &[u8]) -> Router {
    let engine = GovernanceEngine::new(
        governors.iter().map(|b| id(*b)),
        institutions.iter().map(|b| id(*b)),
    )
    .unwrap();
    let documents = Arc::new(MemoryContentStore::new("https://ipfs.test/ipfs", LIMIT));
    router(AppState::new(Arc::new(engine), documents), LIMIT)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn propose(app: &Router, actor: Identity, action: &str, target: Identity) -> u64 {
    let (status, body) = send(
        app,
        "POST",
        "/proposals",
        Some(json!({"actor": actor.to_string(), "action": action, "target": target.to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_u64().unwrap()
}

async fn upload(app: &Router, bytes: &'static [u8]) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/documents")
        .body(Body::from(bytes))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn propose_vote_execute_adds_institution() {
    let app = app(&[1, 2, 3], &[]);
    let pid = propose(&app, id(1), "add_institution", id(10)).await;
    assert_eq!(pid, 0);
    let (_, view) = send(&app, "GET", "/proposals/0", None).await;
    assert_eq!(view["id"], 0);

    let (status, view) = send(&app, "POST", "/proposals/0/vote", Some(json!({"actor": id(1).to_string()}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["yes_votes"], 1);
    assert_eq!(view["threshold"], 2);
    assert_eq!(view["status"], "pending");

    let (status, body) = send(&app, "POST", "/proposals/0/execute", Some(json!({"actor": id(1).to_string()}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "precondition_failed");

    send(&app, "POST", "/proposals/0/vote", Some(json!({"actor": id(2).to_string()}))).await;
    // Execution is open to anyone once the threshold is met.
    let (status, view) = send(&app, "POST", "/proposals/0/execute", Some(json!({"actor": id(99).to_string()}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["executed"], true);

    let (_, roles) = send(&app, "GET", &format!("/roles/{}", id(10)), None).await;
    assert_eq!(roles["institution"], true);
    assert_eq!(roles["governor"], false);

    let (_, institutions) = send(&app, "GET", "/institutions", None).await;
    assert_eq!(institutions["count"], 1);
}

#[tokio::test]
async fn governance_errors_map_to_statuses() {
    let app = app(&[1, 2], &[]);

    let (status, body) = send(
        &app,
        "POST",
        "/proposals",
        Some(json!({"actor": id(9).to_string(), "action": "add_governor", "target": id(3).to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, "GET", "/proposals/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let pid = propose(&app, id(1), "add_governor", id(3)).await;
    let vote = json!({"actor": id(1).to_string()});
    send(&app, "POST", &format!("/proposals/{pid}/vote"), Some(vote.clone())).await;
    let (status, body) = send(&app, "POST", &format!("/proposals/{pid}/vote"), Some(vote)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = send(
        &app,
        "POST",
        "/proposals",
        Some(json!({"actor": id(1).to_string(), "action": "add_governor", "target": Identity::ZERO.to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");

    let (status, _) = send(
        &app,
        "POST",
        "/proposals",
        Some(json!({"actor": "not-an-identity", "action": "add_governor", "target": id(3).to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn voter_lookup_and_listing() {
    let app = app(&[1], &[]);
    for target in 10..13 {
        propose(&app, id(1), "add_institution", id(target)).await;
    }
    send(&app, "POST", "/proposals/1/vote", Some(json!({"actor": id(1).to_string()}))).await;

    let (_, body) = send(&app, "GET", &format!("/proposals/1/voters/{}", id(1)), None).await;
    assert_eq!(body["voted"], true);
    let (_, body) = send(&app, "GET", &format!("/proposals/0/voters/{}", id(1)), None).await;
    assert_eq!(body["voted"], false);

    let (_, page) = send(&app, "GET", "/proposals?count=2", None).await;
    assert_eq!(page["proposals"].as_array().unwrap().len(), 2);
    let cursor = page["cursor"].as_str().unwrap().to_string();
    let (_, page) = send(&app, "GET", &format!("/proposals?count=2&cursor={cursor}"), None).await;
    let rest = page["proposals"].as_array().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["id"], 2);
    assert!(page.get("cursor").is_none());
}

#[tokio::test]
async fn documents_round_trip_through_the_store() {
    let app = app(&[1], &[]);
    let (status, body) = upload(&app, b"diploma scan").await;
    assert_eq!(status, StatusCode::CREATED);
    let cid = body["cid"].as_str().unwrap().to_string();
    assert_eq!(body["url"], format!("https://ipfs.test/ipfs/{cid}"));

    let req = Request::builder()
        .uri(format!("/documents/{cid}/content"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"diploma scan");

    let (status, _) = upload(&app, b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/documents/b2unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/documents/b2unknown/content", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn document_lookup_resolves_to_gateway_url() {
    let app = app(&[1], &[]);
    let (_, uploaded) = upload(&app, b"diploma").await;
    let cid = uploaded["cid"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/documents/{cid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cid"], cid);
    assert_eq!(body["url"], format!("https://ipfs.test/ipfs/{cid}"));
    assert_eq!(body, uploaded);
}

#[tokio::test]
async fn institutions_issue_and_students_verify() {
    let app = app(&[1], &[10]);
    let (_, doc) = upload(&app, b"BSc transcript").await;
    let cid = doc["cid"].as_str().unwrap().to_string();

    let credential = json!({
        "issuer": id(10).to_string(),
        "credential_id": "UNI-2024-001",
        "student": id(50).to_string(),
        "student_name": "Ada Lovelace",
        "institution_name": "Analytical University",
        "degree": "BSc Mathematics",
        "cid": cid,
    });
    let (status, record) = send(&app, "POST", "/credentials", Some(credential.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["issuer"], id(10).to_string());

    let (status, _) = send(&app, "POST", "/credentials", Some(credential.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut forged = credential;
    forged["issuer"] = json!(id(11).to_string());
    forged["credential_id"] = json!("UNI-2024-002");
    let (status, _) = send(&app, "POST", "/credentials", Some(forged)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, fetched) = send(&app, "GET", &format!("/credentials/{cid}"), None).await;
    assert_eq!(fetched["credential_id"], "UNI-2024-001");
    let (status, by_id) = send(&app, "GET", "/credentials/by-id/UNI-2024-001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, fetched);
    let (status, _) = send(&app, "GET", "/credentials/by-id/UNI-1999-404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", &format!("/students/{}/credentials", id(50)), None).await;
    assert_eq!(list["credentials"].as_array().unwrap().len(), 1);
    let (_, list) = send(&app, "GET", &format!("/institutions/{}/credentials", id(10)), None).await;
    assert_eq!(list["credentials"].as_array().unwrap().len(), 1);

    let (_, ok) = send(&app, "POST", "/verify", Some(json!({"cid": cid, "student": id(50).to_string()}))).await;
    assert_eq!(ok["valid"], true);
    let (_, bad) = send(&app, "POST", "/verify", Some(json!({"cid": cid, "student": id(51).to_string()}))).await;
    assert_eq!(bad["valid"], false);
    assert!(bad.get("record").is_none());
}

#[tokio::test]
async fn health_reports_counts() {
    let app = app(&[1, 2], &[10]);
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["governors"], 2);
    assert_eq!(body["institutions"], 1);
    assert_eq!(body["proposals"], 0);
}
