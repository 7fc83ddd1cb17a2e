
use super::*;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway_for(server: &MockServer) -> RestGateway {
    RestGateway::new(server.uri(), "service-role-key")
}

#[tokio::test]
async fn test_count_records_reads_content_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/projects"))
        .and(header("Prefer", "count=exact"))
        .and(query_param("deleted_at", "is.null"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/42")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    assert_eq!(gateway.count_records("projects").await.unwrap(), 42);
}

#[tokio::test]
async fn test_count_records_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/projects"))
        .and(header("apikey", "service-role-key"))
        .and(header("Authorization", "Bearer service-role-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "*/7")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    assert_eq!(gateway.count_records("projects").await.unwrap(), 7);
}

#[tokio::test]
async fn test_count_records_missing_content_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    let err = gateway.count_records("projects").await.unwrap_err();
    assert!(matches!(err, DataAccessError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_backend_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/projects"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    let err = gateway.count_records("projects").await.unwrap_err();
    match err {
        DataAccessError::Backend { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_find_soft_deleted_collects_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("select", "id"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": 11}, {"id": "row-b"}])),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    let ids = gateway
        .find_soft_deleted_older_than("expenses", chrono::Duration::days(30))
        .await
        .unwrap();
    assert_eq!(ids, vec!["11".to_string(), "row-b".to_string()]);
}

#[tokio::test]
async fn test_purge_counts_removed_rows() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/expenses"))
        .and(query_param("id", "in.(a,b)"))
        .and(header("Prefer", "return=representation"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": "a"}, {"id": "b"}])),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    let purged = gateway
        .purge("expenses", &["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(purged, 2);
}

#[tokio::test]
async fn test_purge_empty_ids_skips_request() {
    // No mock mounted: a request would fail the test via connection refusal.
    let gateway = RestGateway::new("http://127.0.0.1:9", "key");
    assert_eq!(gateway.purge("expenses", &[]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_record_growth_since() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/projects"))
        .and(header("Prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/5")
                .set_body_json(serde_json::json!([])),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server).await;
    let growth = gateway
        .record_growth_since("projects", chrono::Duration::days(7))
        .await
        .unwrap();
    assert_eq!(growth, 5);
}
