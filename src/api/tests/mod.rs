use super::*;
use crate::Config;
use crate::OutreachRunner;
use crate::outreach::test_helpers::{RecordingSleeper, ScriptedDirectory, ScriptedOracle, page_of};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;


/// Runner over scripted doubles that never sleeps for real
fn test_state(directory: ScriptedDirectory, oracle: ScriptedOracle) -> AppState {
    let runner = OutreachRunner::new(Arc::new(directory), Arc::new(oracle))
        .with_sleeper(Arc::new(RecordingSleeper::default()))
        .with_seed(1);
    AppState::new(runner, Arc::new(Config::default()))
}

fn default_state() -> AppState {
    test_state(
        ScriptedDirectory::new(vec![page_of("a", 3)]),
        ScriptedOracle::always_qualified("Hello"),
    )
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_shuts_down_gracefully() {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let state = AppState::new(default_state().runner, Arc::new(config));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_until(state, async move {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = create_router(default_state());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS headers should be present"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.server.cors_enabled = false;
    let state = AppState::new(default_state().runner, Arc::new(config));
    let app = create_router(state);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.server.cors_origins = vec!["https://app.example.com".to_string()];
    let state = AppState::new(default_state().runner, Arc::new(config));
    let app = create_router(state);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "https://app.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://app.example.com")
    );
}
