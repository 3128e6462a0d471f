use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Envelope, AUTH_FAILED, NO_ACTION, UNKNOWN_ACTION};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(uri: &str) -> (StatusCode, Envelope) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

// --- authentication ---

#[tokio::test]
async fn missing_key_is_reported_in_envelope() {
    let (status, envelope) = call("/?api_action=test.echo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope.errors.len(), 1);
    assert_eq!(envelope.errors[0].code, AUTH_FAILED);
}

#[tokio::test]
async fn empty_key_is_rejected() {
    let (_, envelope) = call("/?api_key=&api_action=test.echo").await;
    assert_eq!(envelope.errors[0].code, AUTH_FAILED);
}

// --- actions ---

#[tokio::test]
async fn missing_action_is_reported() {
    let (_, envelope) = call("/?api_key=foo").await;
    assert_eq!(envelope.errors[0].code, NO_ACTION);
}

#[tokio::test]
async fn unknown_action_is_reported_with_200() {
    let (status, envelope) = call("/?api_key=foo&api_action=linode.nope").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope.action, "linode.nope");
    assert_eq!(envelope.errors[0].code, UNKNOWN_ACTION);
}

#[tokio::test]
async fn echo_returns_params_upper_cased() {
    let (_, envelope) = call("/?api_key=foo&api_action=test.echo&foo=bar&label=web").await;
    assert!(envelope.errors.is_empty());
    assert_eq!(envelope.action, "test.echo");
    assert_eq!(envelope.data, serde_json::json!({"FOO": "bar", "LABEL": "web"}));
}

#[tokio::test]
async fn datacenters_lists_fixtures() {
    let (_, envelope) = call("/?api_key=foo&api_action=avail.datacenters").await;
    assert!(envelope.errors.is_empty());
    let list = envelope.data.as_array().unwrap();
    assert!(list.iter().any(|dc| dc["ABBR"] == "newark"));
}

#[tokio::test]
async fn other_paths_are_not_found() {
    let resp = app()
        .oneshot(Request::builder().uri("/v4/linodes").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
