//! End-to-end relay behavior against a mock data aggregation service.

use grade_relay::http::student::render_summary;
use grade_relay::{GradesResult, Student};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

mod common;

use common::CapturedRequest;

fn alice() -> Value {
    json!({
        "name": "Alice",
        "mathGrade": 90.0,
        "englishGrade": 85.5,
        "historyGrade": 70.0,
        "scienceGrade": 100.0
    })
}

/// Mock downstream that records every request it sees.
async fn recording_downstream(body: String) -> (std::net::SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let addr = common::start_programmable_downstream(move |request| {
        recorder.lock().unwrap().push(request);
        let body = body.clone();
        async move { (200, body) }
    })
    .await;
    (addr, seen)
}

#[tokio::test]
async fn test_student_relayed_and_summarized() {
    let downstream_body = common::describe_response(90.0, 85.5, 70.0, 100.0);
    let (downstream, seen) = recording_downstream(downstream_body.clone()).await;
    let relay = common::start_relay(common::relay_config(downstream)).await;

    let res = common::client()
        .post(relay.url("/student"))
        .json(&alice())
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "got {}", content_type);

    let text = res.text().await.unwrap();
    assert!(text.starts_with("Sent the Student to the Data Aggregation Service: "));
    assert!(text.contains(
        "Student{name='Alice', mathGrade=90.0, englishGrade=85.5, historyGrade=70.0, scienceGrade=100.0}"
    ));
    assert!(text.contains("\nAnd got back:\n GradesResult{"));
    assert!(text.contains(
        "mathGrade={count=1.0, mean=90.0, std=null, min=90.0, 25%=90.0, 50%=90.0, 75%=90.0, max=90.0}"
    ));
    assert!(text.contains(
        "englishGrade={count=1.0, mean=85.5, std=null, min=85.5, 25%=85.5, 50%=85.5, 75%=85.5, max=85.5}"
    ));

    let student: Student = serde_json::from_value(alice()).unwrap();
    let grades = GradesResult::from_json(downstream_body.as_bytes()).unwrap();
    assert_eq!(text, render_summary(&student, &grades));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "Exactly one downstream call per request");
    assert_eq!(seen[0].request_line(), "POST /calculateGrades HTTP/1.1");
    assert_eq!(seen[0].header("content-type"), Some("application/json"));
    let forwarded: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(forwarded, alice());
}

#[tokio::test]
async fn test_plain_json_object_response() {
    let body = json!({
        "mathGrade": {"mean": 1.0},
        "englishGrade": {"mean": 2.0},
        "historyGrade": {"mean": 3.0},
        "scienceGrade": {"mean": 4.0}
    })
    .to_string();
    let downstream = common::start_mock_downstream(body).await;
    let relay = common::start_relay(common::relay_config(downstream)).await;

    let res = common::client()
        .post(relay.url("/student"))
        .json(&json!({"name": "Bob"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(text.contains("Student{name='Bob', mathGrade=0.0, englishGrade=0.0, historyGrade=0.0, scienceGrade=0.0}"));
    assert!(text.ends_with(
        "GradesResult{mathGrade={mean=1.0}, englishGrade={mean=2.0}, historyGrade={mean=3.0}, scienceGrade={mean=4.0}}"
    ));
}

#[tokio::test]
async fn test_request_id_propagated_downstream() {
    let (downstream, seen) = recording_downstream(common::describe_response(1.0, 2.0, 3.0, 4.0)).await;
    let relay = common::start_relay(common::relay_config(downstream)).await;

    let res = common::client()
        .post(relay.url("/student"))
        .header("x-request-id", "grades-req-42")
        .json(&alice())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "grades-req-42");
    assert_eq!(seen.lock().unwrap()[0].header("x-request-id"), Some("grades-req-42"));
}

#[tokio::test]
async fn test_request_id_generated_when_absent() {
    let (downstream, seen) = recording_downstream(common::describe_response(1.0, 2.0, 3.0, 4.0)).await;
    let relay = common::start_relay(common::relay_config(downstream)).await;

    let res = common::client()
        .post(relay.url("/student"))
        .json(&alice())
        .send()
        .await
        .unwrap();

    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&generated).is_ok(), "not a uuid: {}", generated);
    assert_eq!(
        seen.lock().unwrap()[0].header("x-request-id"),
        Some(generated.as_str())
    );
}

#[tokio::test]
async fn test_configured_downstream_path() {
    let (downstream, seen) = recording_downstream(common::describe_response(1.0, 2.0, 3.0, 4.0)).await;
    let mut config = common::relay_config(downstream);
    config.downstream.path = "/v2/calculateGrades".to_string();
    let relay = common::start_relay(config).await;

    let res = common::client()
        .post(relay.url("/student"))
        .json(&alice())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        seen.lock().unwrap()[0].request_line(),
        "POST /v2/calculateGrades HTTP/1.1"
    );
}

#[tokio::test]
async fn test_malformed_inbound_body_rejected() {
    let (downstream, seen) = recording_downstream(common::describe_response(1.0, 2.0, 3.0, 4.0)).await;
    let relay = common::start_relay(common::relay_config(downstream)).await;

    let res = common::client()
        .post(relay.url("/student"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_client_error(), "got {}", res.status());
    assert!(seen.lock().unwrap().is_empty(), "Nothing should reach downstream");
}

#[tokio::test]
async fn test_health() {
    let relay = common::start_relay(common::relay_config(common::dead_address().await)).await;

    let res = common::client().get(relay.url("/health")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "UP");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
