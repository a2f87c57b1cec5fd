//! Integration tests for the content client against a mock HTTP server.
//!
//! Covers construction, reads, the auth and draft-key headers, query
//! encoding, retry classification, network failures, and the write verbs.

mod common;

use cms_api::client::{ClientOptions, ContentClient};
use cms_api::endpoints::contents::{CreateRequest, DeleteRequest, GetRequest, UpdateRequest};
use cms_api::query::Queries;
use cms_api::response::{ListResponse, WriteResponse};
use cms_core::error::CmsError;
use common::{client_for, fast_retry};
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

// ---- Construction ----

#[test]
fn valid_credentials_build_a_client() {
    let client = ContentClient::new("serviceDomain", "apiKey", ClientOptions::new()).unwrap();
    assert_eq!(client.api_root(), "https://serviceDomain.microcms.io/api/v1");
}

#[test]
fn missing_credentials_fail_with_config_error() {
    for (domain, key) in [("", "apiKey"), ("serviceDomain", "")] {
        match ContentClient::new(domain, key, ClientOptions::new()) {
            Err(CmsError::Config(msg)) => {
                assert_eq!(msg, "parameter is required (check serviceDomain and apiKey)")
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("construction should fail for {domain:?}/{key:?}"),
        }
    }
}

// ---- Reads ----

#[tokio::test]
async fn get_list_sends_api_key_and_decodes_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list-type"))
        .and(header("x-microcms-api-key", "apiKey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": [{ "id": "foo", "title": "Hello, microCMS!" }],
            "totalCount": 1,
            "offset": 0,
            "limit": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let list: ListResponse<Value> = client.get_list(GetRequest::new("list-type")).await.unwrap();

    assert_eq!(list.total_count, 1);
    assert_eq!(list.contents[0]["title"], "Hello, microCMS!");
}

#[tokio::test]
async fn get_list_detail_targets_content_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list-type/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "foo" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let detail: Value = client
        .get_list_detail(GetRequest::new("list-type").content_id("foo"))
        .await
        .unwrap();
    assert_eq!(detail, json!({ "id": "foo" }));
}

#[tokio::test]
async fn get_list_detail_requires_content_id() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), ClientOptions::new());

    let err = client
        .get_list_detail::<Value>(GetRequest::new("list-type"))
        .await
        .unwrap_err();
    assert!(matches!(err, CmsError::Validation(ref m) if m == "contentId is required"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn get_object_reads_singleton() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/object-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "settings" })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let object: Value = client.get_object(GetRequest::new("object-type")).await.unwrap();
    assert_eq!(object["title"], "settings");
}

#[tokio::test]
async fn queries_are_encoded_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list-type"))
        .and(query_param("limit", "100"))
        .and(query_param("fields", "id,title"))
        .and(query_param("orders", "publishedAt"))
        .and(query_param("draftKey", "dk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let queries = Queries {
        limit: Some(100),
        fields: Some(vec!["id".into(), "title".into()]),
        orders: Some("publishedAt".into()),
        draft_key: Some("dk".into()),
        ..Queries::default()
    };
    let _: ListResponse<Value> = client
        .get_list(GetRequest::new("list-type").queries(queries))
        .await
        .unwrap();
}

#[tokio::test]
async fn global_draft_key_is_sent_on_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/object-type"))
        .and(header("x-global-draft-key", "globalDraftKey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(
        &server.uri(),
        ClientOptions::new().with_global_draft_key("globalDraftKey"),
    );
    let _: Value = client.get_object(GetRequest::new("object-type")).await.unwrap();
}

#[tokio::test]
async fn caller_api_key_header_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-microcms-api-key", "otherKey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let request = GetRequest::new("object-type").header(
        HeaderName::from_static("x-microcms-api-key"),
        HeaderValue::from_static("otherKey"),
    );
    let _: Value = client.get_object(request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].headers.get_all("x-microcms-api-key").iter().count(), 1);
}

#[tokio::test]
async fn missing_endpoint_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), ClientOptions::new());

    let err = client.get::<Value>(GetRequest::new("")).await.unwrap_err();
    assert!(matches!(err, CmsError::Validation(ref m) if m == "endpoint is required"));

    let err = client.get_list::<Value>(GetRequest::new("")).await.unwrap_err();
    assert!(matches!(err, CmsError::Validation(_)));

    let err = client
        .create(CreateRequest::new("", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, CmsError::Validation(_)));

    assert_eq!(request_count(&server).await, 0);
}

// ---- Retry ----

#[tokio::test]
async fn persistent_500_is_attempted_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new().with_retry_policy(fast_retry()));
    let err = client.get::<Value>(GetRequest::new("list-type")).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "fetch API response status: 500\n  message is `boom`");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn client_error_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "limit is too large" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new().with_retry_policy(fast_retry()));
    let err = client.get::<Value>(GetRequest::new("list-type")).await.unwrap_err();

    match err {
        CmsError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("limit is too large"));
        }
        other => panic!("expected Api error, got {other}"),
    }
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn non_json_error_body_has_no_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let err = client.get::<Value>(GetRequest::new("missing")).await.unwrap_err();
    assert_eq!(err.to_string(), "fetch API response status: 404");
}

#[tokio::test]
async fn recovers_after_two_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "ok" })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new().with_retry_policy(fast_retry()));
    let value: Value = client.get(GetRequest::new("object-type")).await.unwrap();

    assert_eq!(value["title"], "ok");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new().with_retry_policy(fast_retry()));
    let _: Value = client.get(GetRequest::new("object-type")).await.unwrap();
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn retry_disabled_makes_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let err = client.get::<Value>(GetRequest::new("list-type")).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn connection_failure_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"), ClientOptions::new());
    let err = client.get::<Value>(GetRequest::new("list-type")).await.unwrap_err();

    assert!(matches!(err, CmsError::Network(_)), "got {err}");
    assert!(err.is_retryable());
}

// ---- Writes ----

#[tokio::test]
async fn create_without_id_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/list-type"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "title": "new" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let created = client
        .create(CreateRequest::new("list-type", json!({ "title": "new" })))
        .await
        .unwrap();
    assert_eq!(created, WriteResponse { id: "created".into() });
}

#[tokio::test]
async fn create_with_id_puts_as_draft() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/list-type/my-id"))
        .and(query_param("status", "draft"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "my-id" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let created = client
        .create(
            CreateRequest::new("list-type", json!({ "title": "draft" }))
                .content_id("my-id")
                .draft(true),
        )
        .await
        .unwrap();
    assert_eq!(created.id, "my-id");
}

#[tokio::test]
async fn update_patches_record_and_object() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/list-type/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "foo" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/object-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "object-type" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    let updated = client
        .update(UpdateRequest::new("list-type", json!({ "title": "t" })).content_id("foo"))
        .await
        .unwrap();
    assert_eq!(updated.id, "foo");

    let updated = client
        .update(UpdateRequest::new("object-type", json!({ "title": "t" })))
        .await
        .unwrap();
    assert_eq!(updated.id, "object-type");
}

#[tokio::test]
async fn delete_accepts_empty_202() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/list-type/foo"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), ClientOptions::new());
    client
        .delete(DeleteRequest::new("list-type", "foo"))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_requires_content_id() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri(), ClientOptions::new());

    let err = client
        .delete(DeleteRequest::new("list-type", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, CmsError::Validation(ref m) if m == "contentId is required"));
    assert_eq!(request_count(&server).await, 0);
}
