//! HttpRemoteEvaluator against a mocked calcsrv

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use std::sync::Arc;
use std::time::Duration;

use calc_engine::{CalcEngine, Value};
use calc_history::{HistoryStore, LocalHistoryLog, MemoryBlobStore};
use calc_session::{
    EvalSource, EvaluationPipeline, HttpRemoteEvaluator, RemoteError, RemoteEvaluator,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn evaluator(server: &MockServer) -> HttpRemoteEvaluator {
    HttpRemoteEvaluator::new(server.uri(), Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_value_is_taken_from_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator/calculate"))
        .and(body_json(json!({"expression": "5 + 3"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "expression": "5 + 3",
                "value": {"kind": "real", "value": 8.0},
                "result": "8"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = evaluator(&server).evaluate("5 + 3").await.unwrap();
    assert_eq!(value, Value::Real(8.0));
}

#[tokio::test]
async fn test_rejection_carries_service_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator/calculate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": {"code": 400, "message": "Invalid expression"}
        })))
        .mount(&server)
        .await;

    let err = evaluator(&server).evaluate("5 +").await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 400,
            message: "Invalid expression".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = evaluator(&server).evaluate("1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn test_pipeline_prefers_remote_and_formats_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "expression": "1e13",
                "value": {"kind": "real", "value": 1e13},
                "result": "remote rendering is ignored"
            }
        })))
        .mount(&server)
        .await;

    let history = Arc::new(HistoryStore::new(
        LocalHistoryLog::new(Arc::new(MemoryBlobStore::new())),
        None,
    ));
    let pipeline = EvaluationPipeline::new(Arc::new(CalcEngine::new().unwrap()), history)
        .with_remote(Arc::new(evaluator(&server)), Duration::from_millis(500));

    let evaluation = pipeline.evaluate("1e13").await.unwrap();
    assert_eq!(evaluation.source, EvalSource::Remote);
    assert_eq!(evaluation.result(), "1.00000e+13");
}

#[tokio::test]
async fn test_slow_service_falls_back_within_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/calculator/calculate"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let history = Arc::new(HistoryStore::new(
        LocalHistoryLog::new(Arc::new(MemoryBlobStore::new())),
        None,
    ));
    let remote = HttpRemoteEvaluator::new(server.uri(), Duration::from_secs(10)).unwrap();
    let pipeline = EvaluationPipeline::new(Arc::new(CalcEngine::new().unwrap()), history.clone())
        .with_remote(Arc::new(remote), Duration::from_millis(100));

    let evaluation = pipeline.evaluate("2^10").await.unwrap();
    assert_eq!(evaluation.result(), "1024");
    assert_eq!(evaluation.fallback, Some(RemoteError::Timeout(100)));
    assert_eq!(history.len().await, 1);
}
