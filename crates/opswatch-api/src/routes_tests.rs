
use super::*;
use crate::auth::API_KEY_HEADER;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::Notify;
use tokio::time::timeout;
use tower::ServiceExt;

use opswatch_gateway::MemoryGateway;
use opswatch_scheduler::{Scheduler, TaskAction, TaskRegistry};

fn quick_action(message: &str) -> TaskAction {
    let message = message.to_string();
    Arc::new(move || {
        let message = message.clone();
        Box::pin(async move { Ok(message) })
    })
}

struct TestApp {
    router: Router,
    gateway: Arc<MemoryGateway>,
    registry: Arc<TaskRegistry>,
}

fn test_app(api_key: Option<&str>, origins: &[&str]) -> TestApp {
    let registry = Arc::new(TaskRegistry::new());
    registry
        .register("health_check", None, quick_action("backend reachable"))
        .unwrap();
    let scheduler = Arc::new(Scheduler::new(registry.clone(), 20));
    let gateway = Arc::new(MemoryGateway::new());
    let state = Arc::new(AppState::new(
        scheduler,
        gateway.clone(),
        api_key.map(String::from),
        origins.iter().map(|s| s.to_string()).collect(),
        vec!["projects".to_string()],
    ));
    TestApp {
        router: build_router(state),
        gateway,
        registry,
    }
}

async fn send(router: &Router, req: Request<Body>) -> axum::response::Response {
    router.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_service_info_is_public() {
    let app = test_app(Some("secret"), &[]);
    let response = send(&app.router, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "opswatch");
}

#[tokio::test]
async fn test_health_is_public_and_backend_independent() {
    let app = test_app(Some("secret"), &[]);
    // Liveness must not depend on backend health.
    app.gateway.set_failing(true);

    let response = send(&app.router, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_dashboard_is_public_and_degrades_gracefully() {
    let app = test_app(Some("secret"), &[]);
    app.gateway.set_failing(true);

    let response = send(&app.router, get("/dashboard")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("health_check"));
    assert!(html.contains("unavailable"));
}

#[tokio::test]
async fn test_status_requires_api_key() {
    let app = test_app(Some("secret"), &[]);

    let response = send(&app.router, get("/status")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app.router, get_with_key("/status", "wrong")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app.router, get_with_key("/status", "secret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tasks_registered"], 1);
}

#[tokio::test]
async fn test_protected_routes_open_without_configured_key() {
    let app = test_app(None, &[]);
    let response = send(&app.router, get("/jobs")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_origin_restriction_rejects_non_members() {
    let app = test_app(Some("secret"), &["https://app.example.com"]);

    // Correct key, wrong origin: still rejected.
    let request = Request::builder()
        .uri("/status")
        .header(API_KEY_HEADER, "secret")
        .header("origin", "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Member origin passes.
    let request = Request::builder()
        .uri("/status")
        .header(API_KEY_HEADER, "secret")
        .header("origin", "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_origin_restriction_ignores_public_routes() {
    let app = test_app(Some("secret"), &["https://app.example.com"]);
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_run_task_returns_job_run() {
    let app = test_app(Some("secret"), &[]);
    let request = Request::builder()
        .method("POST")
        .uri("/run/health_check")
        .header(API_KEY_HEADER, "secret")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["run"]["task"], "health_check");
    assert_eq!(body["run"]["outcome"], "success");
    assert_eq!(body["run"]["message"], "backend reachable");
}

#[tokio::test]
async fn test_run_unknown_task_is_404() {
    let app = test_app(Some("secret"), &[]);
    let request = Request::builder()
        .method("POST")
        .uri("/run/nope")
        .header(API_KEY_HEADER, "secret")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_run_busy_task_is_409() {
    let app = test_app(Some("secret"), &[]);

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let action: TaskAction = {
        let entered = entered.clone();
        let release = release.clone();
        Arc::new(move || {
            let entered = entered.clone();
            let release = release.clone();
            Box::pin(async move {
                entered.notify_one();
                release.notified().await;
                Ok("done".to_string())
            })
        })
    };
    app.registry.register("cleanup", None, action).unwrap();

    let router = app.router.clone();
    let first = tokio::spawn(async move {
        router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run/cleanup")
                    .header(API_KEY_HEADER, "secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    });

    timeout(Duration::from_secs(1), entered.notified())
        .await
        .expect("first run never started");

    let request = Request::builder()
        .method("POST")
        .uri("/run/cleanup")
        .header(API_KEY_HEADER, "secret")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    release.notify_one();
    let first_response = first.await.unwrap();
    assert_eq!(first_response.status(), StatusCode::OK);

    // Exactly one recorded run for the task.
    let response = send(&app.router, get_with_key("/jobs", "secret")).await;
    let body = body_json(response).await;
    let cleanup_runs = body["recent_runs"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["task"] == "cleanup")
        .count();
    assert_eq!(cleanup_runs, 1);
}

#[tokio::test]
async fn test_jobs_snapshot_lists_tasks() {
    let app = test_app(Some("secret"), &[]);
    let response = send(&app.router, get_with_key("/jobs", "secret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["tasks"][0]["name"], "health_check");
}
