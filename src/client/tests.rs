//! Tests for the object client

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::query::QueryOptions;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    object_id: Option<String>,
    player_name: String,
    score: f64,
    cheat_mode: bool,
}

async fn client_for(server: &MockServer) -> ParseClient {
    let mut config = ClientConfig::new("app-id", "rest-key");
    config.server_url = server.uri();
    config.http.rate_limit = None;
    config.http.backoff.initial_ms = 10;
    ParseClient::from_config(&config).unwrap()
}

#[test]
fn test_new_requires_keys() {
    assert!(ParseClient::new("", "key").is_err());
    assert!(ParseClient::new("app", "").is_err());
    assert!(ParseClient::new("app", "key").is_ok());
}

#[tokio::test]
async fn test_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classes/GameScore"))
        .and(header("X-Parse-Application-Id", "app-id"))
        .and(header("X-Parse-REST-API-Key", "rest-key"))
        .and(body_json(json!({
            "playerName": "Sean Plott",
            "score": 1337.0,
            "cheatMode": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "objectId": "Ed1nuqPvcm",
            "createdAt": "2011-08-20T02:06:57.931Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let created = client
        .create(
            "GameScore",
            &GameScore {
                object_id: None,
                player_name: "Sean Plott".to_string(),
                score: 1337.0,
                cheat_mode: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.object_id, "Ed1nuqPvcm");
}

#[tokio::test]
async fn test_get_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/GameScore/Ed1nuqPvcm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objectId": "Ed1nuqPvcm",
            "playerName": "Sean Plott",
            "score": 31337,
            "cheatMode": false,
            "createdAt": "2011-08-20T02:06:57.931Z",
            "updatedAt": "2011-08-20T02:06:57.931Z"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let score: GameScore = client.get("GameScore", "Ed1nuqPvcm").await.unwrap();

    assert_eq!(score.object_id.as_deref(), Some("Ed1nuqPvcm"));
    assert_eq!(score.score, 31337.0);
}

#[tokio::test]
async fn test_get_missing_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/GameScore/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 101,
            "error": "object not found for get"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get::<Value>("GameScore", "gone").await.unwrap_err();

    assert_eq!(err.api_code(), Some(101));
}

#[tokio::test]
async fn test_update_strips_reserved_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/classes/GameScore/Ed1nuqPvcm"))
        .and(body_json(json!({"score": 31337})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updatedAt": "2011-08-21T18:02:52.248Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let updated = client
        .update(
            "GameScore",
            "Ed1nuqPvcm",
            &json!({"objectId": "Ed1nuqPvcm", "score": 31337}),
        )
        .await
        .unwrap();

    assert_eq!(updated.updated_at.to_rfc3339(), "2011-08-21T18:02:52.248+00:00");
}

#[tokio::test]
async fn test_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/classes/GameScore/Ed1nuqPvcm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.delete("GameScore", "Ed1nuqPvcm").await.unwrap();
}

#[tokio::test]
async fn test_query_class() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Widget"))
        .and(query_param("where", r#"{"qty":{"$gt":40}}"#))
        .and(query_param("order", "-qty"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"objectId": "a", "name": "widget a", "qty": 42},
                {"objectId": "b", "name": "widget b", "qty": 41}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let options = QueryOptions::new()
        .where_clause(r#"{"qty":{"$gt":40}}"#)
        .order("-qty")
        .limit(10);
    let results: Vec<Value> = client.query_class("Widget", &options).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["name"], "widget a");
}

#[tokio::test]
async fn test_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Widget"))
        .and(query_param("count", "1"))
        .and(query_param("limit", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "count": 2500
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.count("Widget", "").await.unwrap(), 2500);
}

#[tokio::test]
async fn test_count_missing_in_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.count("Widget", "").await,
        Err(Error::Decode { .. })
    ));
}

#[tokio::test]
async fn test_invalid_class_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .query_class::<Value>("../users", &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidClassName { .. }));
}

#[tokio::test]
async fn test_master_key_and_session_token_clients() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/classes/GameScore/abc"))
        .and(header("X-Parse-Master-Key", "master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/classes/Private/xyz"))
        .and(header("X-Parse-Session-Token", "r:tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"objectId": "xyz"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let admin = client.with_master_key("master").unwrap();
    let user = client.with_session_token("r:tok").unwrap();

    assert!(!client.http().credentials().unwrap().has_master_key());
    assert!(admin.http().credentials().unwrap().has_master_key());

    admin.delete("GameScore", "abc").await.unwrap();
    let obj: Value = user.get("Private", "xyz").await.unwrap();
    assert_eq!(obj["objectId"], "xyz");
}

#[test]
fn test_credential_overrides_need_credentials() {
    let bare = ParseClient::with_http(crate::http::HttpClient::new().unwrap());

    assert!(matches!(
        bare.with_master_key("master"),
        Err(Error::MissingConfigField { .. })
    ));
    assert!(bare.with_session_token("r:tok").is_err());
}

#[tokio::test]
async fn test_get_rejects_bad_object_id_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get::<Value>("GameScore", "../_User")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidObjectId { .. }));
}

#[tokio::test]
async fn test_create_not_resent_after_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classes/GameScore"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/classes/GameScore"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "objectId": "dup",
            "createdAt": "2011-08-20T02:06:57.931Z"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .create("GameScore", &json!({"score": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_fetch_page_retries_edge_proxy_error() {
    use crate::cursor::PageFetcher;

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/GameScore"))
        .respond_with(ResponseTemplate::new(520))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/classes/GameScore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"objectId": "a"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .fetch_page("GameScore", "", 1000, "createdAt", 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_page_request_shape() {
    use crate::cursor::PageFetcher;

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/GameScore"))
        .and(query_param("where", r#"{"cheatMode":false}"#))
        .and(query_param("limit", "1000"))
        .and(query_param("order", "createdAt"))
        .and(query_param("skip", "2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"objectId": "x"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .fetch_page(
            "GameScore",
            r#"{"cheatMode":false}"#,
            1000,
            "createdAt",
            2000,
        )
        .await
        .unwrap();

    assert_eq!(page, vec![json!({"objectId": "x"})]);
}
