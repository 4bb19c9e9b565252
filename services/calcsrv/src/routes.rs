//! API routes for calcsrv

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::app::AppState;
use crate::handlers::{calculator, health_check, history};

/// Create all API routes with state
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Remote evaluator
        .route("/api/calculator/calculate", post(calculator::calculate))
        .route("/api/calculator/validate", post(calculator::validate))
        .route("/api/calculator/functions", get(calculator::list_functions))
        // Bulk history log
        .route(
            "/api/history",
            get(history::list_history)
                .post(history::add_history)
                .delete(history::clear_history),
        )
        .route("/api/history/stats", get(history::history_stats))
        .route("/api/history/{id}", delete(history::delete_history))
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_routes(AppState::new(Config::default()).unwrap());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["service"], "calcsrv");
    }

    #[tokio::test]
    async fn test_calculate_cleans_expression() {
        let app = create_routes(AppState::new(Config::default()).unwrap());

        let (status, body) = send(
            app,
            post_json("/api/calculator/calculate", json!({"expression": " 6  ×  7 "})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["expression"], "6 * 7");
        assert_eq!(body["data"]["result"], "42");
        assert_eq!(body["data"]["value"], json!({"kind": "real", "value": 42.0}));
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = create_routes(AppState::new(Config::default()).unwrap());
        let request = Request::builder()
            .method("POST")
            .uri("/api/calculator/calculate")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 400);
    }
}
