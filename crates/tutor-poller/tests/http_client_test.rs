//! HTTP generation client against a mock tutoring API.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tutor_core::{Error, GenerationApi, GenerationState};
use tutor_poller::{ClientConfig, HttpGenerationClient};

fn status_json(subject_id: i64, status: &str) -> serde_json::Value {
    json!({
        "user_id": 7,
        "subject_id": subject_id,
        "status": status,
        "chapters_generated": true,
        "topics_generated": false,
        "error_message": null,
        "updated_at": "2026-03-01T10:15:00Z"
    })
}

#[tokio::test]
async fn test_start_generation_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/7/subjects/3/generation"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "queued": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        HttpGenerationClient::new(ClientConfig::new(server.uri()).with_token("secret")).unwrap();
    client.start_generation(7, 3).await.unwrap();
}

#[tokio::test]
async fn test_fetch_status_parses_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/subjects/3/generation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "exists": true, "status": status_json(3, "in_progress") })),
        )
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(ClientConfig::new(server.uri())).unwrap();
    let lookup = client.fetch_status(7, 3).await.unwrap();
    assert!(lookup.exists);
    let status = lookup.status.unwrap();
    assert_eq!(status.status, GenerationState::InProgress);
    assert!(status.chapters_generated);
}

#[tokio::test]
async fn test_fetch_status_without_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/subjects/9/generation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "exists": false })))
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(ClientConfig::new(server.uri())).unwrap();
    let lookup = client.fetch_status(7, 9).await.unwrap();
    assert!(!lookup.exists);
    assert!(lookup.status.is_none());
}

#[tokio::test]
async fn test_fetch_all_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/generation"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([status_json(1, "completed"), status_json(2, "pending")])),
        )
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(ClientConfig::new(server.uri())).unwrap();
    let statuses = client.fetch_all_statuses(7).await.unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].is_terminal());
    assert!(!statuses[1].is_terminal());
}

#[tokio::test]
async fn test_error_bodies_map_to_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/users/7/subjects/1/generation"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error": "No generation for user 7 subject 1" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/7/generation"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(ClientConfig::new(server.uri())).unwrap();

    let err = client.reset_generation(7, 1).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("No generation for user 7 subject 1"));

    let err = client.start_all_generation(7).await.unwrap_err();
    assert!(matches!(err, Error::Request(ref m) if m.contains("database unavailable")));
}

#[tokio::test]
async fn test_invalid_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/7/generation"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpGenerationClient::new(ClientConfig::new(server.uri())).unwrap();
    let err = client.fetch_all_statuses(7).await.unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    let client = HttpGenerationClient::new(ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.fetch_status(7, 1).await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}
