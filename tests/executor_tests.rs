use mockito::Matcher;
use pivnet_rs::{CachedTokenService, Client, ClientConfig, PivnetError};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;


use test_helpers::{api_path, create_client, sample_company_group, FakeAccessTokenService};

#[tokio::test]
async fn test_success_body_is_returned_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", api_path("/anything").as_str())
        .with_status(202)
        .with_body("not json at all")
        .create_async()
        .await;

    let client = create_client(&server.url(), FakeAccessTokenService::returning("some-token"));
    let response = client.executor().get("/anything").await.unwrap();

    assert_eq!(response.status, 202);
    assert_eq!(response.body, b"not json at all".to_vec());
}

#[tokio::test]
async fn test_request_body_sets_content_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", api_path("/things").as_str())
        .match_header("content-type", "application/json")
        .match_header("authorization", "Bearer some-token")
        .match_body(Matcher::Json(json!({"a": 1})))
        .with_status(201)
        .with_body("{}")
        .create_async()
        .await;

    let client = create_client(&server.url(), FakeAccessTokenService::returning("some-token"));
    client.executor()
        .execute(Method::POST, "/things", Some(&json!({"a": 1})))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_token_failure_sends_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let token_service = FakeAccessTokenService::failing(PivnetError::token_fetch(500));
    let client = create_client(&server.url(), token_service.clone());
    let err = client.company_groups.list().await.unwrap_err();

    assert!(matches!(err, PivnetError::TokenFetch { status: 500 }));
    assert_eq!(token_service.call_count(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_host_trailing_slash_does_not_double_up() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/company_groups/12")
        .with_status(200)
        .with_body(sample_company_group(12).to_string())
        .create_async()
        .await;

    let host = format!("{}/", server.url());
    let client = create_client(&host, FakeAccessTokenService::returning("some-token"));
    client.company_groups.get(12).await.unwrap();

    assert_eq!(client.config().host, server.url());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let client = create_client("http://127.0.0.1:1", FakeAccessTokenService::returning("some-token"));
    let err = client.company_groups.list().await.unwrap_err();

    assert!(matches!(err, PivnetError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_slow_server_past_deadline_is_a_transport_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", api_path("/company_groups").as_str())
        .with_status(200)
        .with_chunked_body(|w| {
            thread::sleep(Duration::from_millis(500));
            w.write_all(br#"{"company_groups": []}"#)
        })
        .create_async()
        .await;

    let config = ClientConfig::new(server.url()).with_timeout(Duration::from_millis(50));
    let client = Client::new(FakeAccessTokenService::returning("some-token"), config).unwrap();
    let err = client.company_groups.list().await.unwrap_err();

    assert!(matches!(err, PivnetError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_non_2xx_json_without_message_falls_back_to_raw_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", api_path("/company_groups").as_str())
        .with_status(500)
        .with_body(r#"{"error":"boom"}"#)
        .create_async()
        .await;

    let client = create_client(&server.url(), FakeAccessTokenService::returning("some-token"));
    let err = client.company_groups.list().await.unwrap_err();

    match err {
        PivnetError::Api { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, r#"{"error":"boom"}"#);
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_cached_token_is_refetched_once() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("GET", api_path("/company_groups/1234").as_str())
        .match_header("authorization", "Bearer token-1")
        .with_status(401)
        .with_body(r#"{"message":"token expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", api_path("/company_groups/1234").as_str())
        .match_header("authorization", "Bearer token-2")
        .with_status(200)
        .with_body(sample_company_group(1234).to_string())
        .expect(1)
        .create_async()
        .await;

    let fake = FakeAccessTokenService::returning_sequence(&["token-1", "token-2"]);
    let client = create_client(&server.url(), Arc::new(CachedTokenService::new(fake.clone())));

    let company_group = client.company_groups.get(1234).await.unwrap();

    assert_eq!(company_group.id, 1234);
    assert_eq!(fake.call_count(), 2);
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_second_rejection_is_returned_without_further_retry() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", api_path("/company_groups").as_str())
        .match_header("authorization", "Bearer token-1")
        .with_status(401)
        .with_body(r#"{"message":"token expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", api_path("/company_groups").as_str())
        .match_header("authorization", "Bearer token-2")
        .with_status(401)
        .with_body(r#"{"message":"account disabled"}"#)
        .expect(1)
        .create_async()
        .await;

    let fake = FakeAccessTokenService::returning_sequence(&["token-1", "token-2", "token-3"]);
    let client = create_client(&server.url(), Arc::new(CachedTokenService::new(fake.clone())));

    let err = client.company_groups.list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("account disabled"));
    assert_eq!(fake.call_count(), 2);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_uncached_token_service_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", api_path("/company_groups").as_str())
        .with_status(401)
        .with_body(r#"{"message":"unauthorized"}"#)
        .expect(1)
        .create_async()
        .await;

    let fake = FakeAccessTokenService::returning("some-token");
    let client = create_client(&server.url(), fake.clone());

    let err = client.company_groups.list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(fake.call_count(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_token_is_reused_across_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", api_path("/company_groups").as_str())
        .match_header("authorization", "Bearer token-1")
        .with_status(200)
        .with_body(r#"{"company_groups": []}"#)
        .expect(3)
        .create_async()
        .await;

    let fake = FakeAccessTokenService::returning_sequence(&["token-1", "token-2"]);
    let client = create_client(&server.url(), Arc::new(CachedTokenService::new(fake.clone())));

    for _ in 0..3 {
        client.company_groups.list().await.unwrap();
    }

    assert_eq!(fake.call_count(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_from_refresh_token_exchanges_then_calls_api() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/api/v2/authentication/access_tokens")
        .match_body(Matcher::Json(json!({"refresh_token": "some-refresh-token"})))
        .with_status(200)
        .with_body(r#"{"access_token": "exchanged-token"}"#)
        .expect(1)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/api/v2/company_groups")
        .match_header("authorization", "Bearer exchanged-token")
        .with_status(200)
        .with_body(r#"{"company_groups": [{"id": 2, "name": "company group 1"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let client = Client::from_refresh_token("some-refresh-token", ClientConfig::new(server.url())).unwrap();
    client.company_groups.list().await.unwrap();
    let company_groups = client.company_groups.list().await.unwrap();

    assert_eq!(company_groups[0].id, 2);
    token.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", api_path("/company_groups").as_str())
        .with_status(200)
        .with_body(r#"{"company_groups": [{"id": 2}, {"id": 3}]}"#)
        .expect(4)
        .create_async()
        .await;

    let fake = FakeAccessTokenService::returning("some-token");
    let client = create_client(&server.url(), Arc::new(CachedTokenService::new(fake.clone())));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.company_groups.list().await })
        })
        .collect();

    for handle in handles {
        let company_groups = handle.await.unwrap().unwrap();
        assert_eq!(company_groups.len(), 2);
    }
    assert_eq!(fake.call_count(), 1);
}

#[test]
fn test_empty_host_is_rejected() {
    let result = Client::new(
        FakeAccessTokenService::returning("some-token"),
        ClientConfig::new(""),
    );

    assert!(matches!(result, Err(PivnetError::Configuration(_))));
}

#[test]
fn test_empty_user_agent_is_not_sent() {
    let config = ClientConfig::new("https://network.example.com").with_user_agent("");
    assert_eq!(config.user_agent, None);
}
