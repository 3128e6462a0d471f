//! Authenticated request dispatch and envelope parsing.
//!
//! # Design
//! `RequestDispatcher` splits each call into `build_request` (no I/O),
//! one `Transport::execute`, and `parse_response` (no I/O). `send` chains
//! the three and is the only method that touches the network.
//!
//! The reserved `api_key` and `api_action` parameters are always written
//! after the caller's parameters have been copied, replacing any caller
//! entry of the same name. The caller can neither spoof the key nor redirect
//! the call to another action.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::ClientConfig;
use crate::error::{ApiError, RemoteError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::response::{wrap, Value};

/// Per-call parameters. Values are sent as query-string text.
///
/// Entries named exactly `api_key` or `api_action` are replaced by the
/// dispatcher's own values; every other entry is sent unchanged.
pub type Params = BTreeMap<String, String>;

/// Query parameter carrying the configured API key.
pub const API_KEY_PARAM: &str = "api_key";
/// Query parameter carrying the operation name.
pub const API_ACTION_PARAM: &str = "api_action";

/// The JSON body every action responds with. `ERRORARRAY` is mandatory so
/// an unrelated JSON object is never mistaken for a successful call.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "ERRORARRAY")]
    errors: Vec<JsonValue>,
    #[serde(rename = "ACTION", default)]
    action: Option<String>,
    #[serde(rename = "DATA", default)]
    data: JsonValue,
}

/// Sends named actions to the API on behalf of one API key.
#[derive(Clone)]
pub struct RequestDispatcher {
    api_key: String,
    api_url: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url().to_string(),
            transport,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build the outgoing request for `action` without sending it.
    ///
    /// `params` is copied, never modified.
    pub fn build_request(&self, action: &str, params: &Params) -> Result<HttpRequest, ApiError> {
        if action.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "operation name must not be empty".to_string(),
            ));
        }

        let mut query = params.clone();
        query.insert(API_KEY_PARAM.to_string(), self.api_key.clone());
        query.insert(API_ACTION_PARAM.to_string(), action.to_string());

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.api_url.clone(),
            query: query.into_iter().collect(),
        })
    }

    /// Turn a response body into the mapped `DATA` node.
    ///
    /// A non-empty `ERRORARRAY` fails the call and `DATA` is discarded. The
    /// HTTP status is not consulted.
    pub fn parse_response(&self, action: &str, response: HttpResponse) -> Result<Value, ApiError> {
        tracing::debug!(status = response.status, bytes = response.body.len(), "response received");

        let body: JsonValue = serde_json::from_str(&response.body)?;
        if !body.is_object() {
            return Err(ApiError::Parse(serde::de::Error::custom(
                "response body is not a JSON object",
            )));
        }
        let envelope: Envelope = serde_json::from_value(body)?;
        if let Some(echoed) = envelope.action.as_deref() {
            if echoed != action {
                tracing::debug!(echoed, "response names a different action");
            }
        }

        if !envelope.errors.is_empty() {
            let errors: Vec<RemoteError> = envelope.errors.iter().map(RemoteError::from_json).collect();
            tracing::warn!(count = errors.len(), "API reported errors");
            return Err(ApiError::Remote {
                action: action.to_string(),
                errors,
            });
        }

        Ok(wrap(envelope.data))
    }

    /// Perform `action` with `params`: exactly one transport call, no retries.
    #[tracing::instrument(name = "linode.send", skip_all, fields(action = %action))]
    pub fn send(&self, action: &str, params: &Params) -> Result<Value, ApiError> {
        let request = self.build_request(action, params)?;
        tracing::debug!(url = %request.url, params = params.len(), "dispatching request");
        let response = self.transport.execute(request).map_err(ApiError::Transport)?;
        self.parse_response(action, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::TransportError;

    const ECHO_BODY: &str = r#"{
        "ERRORARRAY": [],
        "ACTION": "test.echo",
        "DATA": {"FOO": "bar"}
    }"#;

    /// Transport that records each request and answers with a fixed body.
    fn recording(body: &'static str) -> (Arc<Mutex<Vec<HttpRequest>>>, Arc<dyn Transport>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let transport: Arc<dyn Transport> =
            Arc::new(move |req: HttpRequest| -> Result<HttpResponse, TransportError> {
                log.lock().unwrap().push(req);
                Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                })
            });
        (seen, transport)
    }

    fn dispatcher(transport: Arc<dyn Transport>) -> RequestDispatcher {
        let config = ClientConfig::new("foo").with_api_url("https://fake.linode.com/");
        RequestDispatcher::new(&config, transport).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn send_calls_configured_url_with_key_and_action() {
        let (seen, transport) = recording(ECHO_BODY);
        dispatcher(transport).send("test.echo", &Params::new()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "https://fake.linode.com/");
        assert_eq!(seen[0].query_param("api_key"), Some("foo"));
        assert_eq!(seen[0].query_param("api_action"), Some("test.echo"));
    }

    #[test]
    fn send_forwards_caller_params() {
        let (seen, transport) = recording(ECHO_BODY);
        dispatcher(transport)
            .send("test.echo", &params(&[("foo", "bar")]))
            .unwrap();
        assert_eq!(seen.lock().unwrap()[0].query_param("foo"), Some("bar"));
    }

    #[test]
    fn caller_cannot_override_reserved_params() {
        let attempts = [
            params(&[("api_key", "h4x0r")]),
            params(&[("api_action", "h4x0r")]),
            params(&[("api_key", "h4x0r"), ("api_action", "h4x0r")]),
        ];
        for attempt in &attempts {
            let (seen, transport) = recording(ECHO_BODY);
            dispatcher(transport).send("test.echo", attempt).unwrap();

            let seen = seen.lock().unwrap();
            let req = &seen[0];
            assert_eq!(req.query_param("api_key"), Some("foo"), "{attempt:?}");
            assert_eq!(req.query_param("api_action"), Some("test.echo"), "{attempt:?}");
            assert!(req.query.iter().all(|(_, v)| v != "h4x0r"), "{attempt:?}");
        }
    }

    #[test]
    fn only_exact_reserved_names_are_replaced() {
        let (_, transport) = recording(ECHO_BODY);
        let req = dispatcher(transport)
            .build_request("test.echo", &params(&[("API_KEY", "upper"), ("label", "web")]))
            .unwrap();
        assert_eq!(req.query_param("api_key"), Some("foo"));
        assert_eq!(req.query_param("API_KEY"), Some("upper"));
        assert_eq!(req.query_param("label"), Some("web"));
        assert_eq!(req.query.len(), 4);
    }

    #[test]
    fn build_request_leaves_caller_params_untouched() {
        let (_, transport) = recording(ECHO_BODY);
        let original = params(&[("api_key", "h4x0r"), ("label", "web")]);
        let copy = original.clone();
        dispatcher(transport).build_request("test.echo", &original).unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn empty_action_is_rejected_before_any_io() {
        let (seen, transport) = recording(ECHO_BODY);
        let err = dispatcher(transport).send("", &Params::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn send_returns_lower_cased_data() {
        let (_, transport) = recording(ECHO_BODY);
        let result = dispatcher(transport).send("test.echo", &Params::new()).unwrap();
        assert_eq!(result.get("foo").and_then(Value::as_str), Some("bar"));
        assert!(result.get("FOO").is_none());
    }

    #[test]
    fn error_array_fails_the_call() {
        let (_, transport) = recording(
            r#"{"ERRORARRAY":["failure"],"ACTION":"test.echo","DATA":{"foo":"bar"}}"#,
        );
        let err = dispatcher(transport)
            .send("test.echo", &params(&[("api_action", "failure")]))
            .unwrap_err();
        match err {
            ApiError::Remote { action, errors } => {
                assert_eq!(action, "test.echo");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "failure");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let (_, transport) = recording("<html>502 Bad Gateway</html>");
        let err = dispatcher(transport).send("test.echo", &Params::new()).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn non_object_body_is_parse_error() {
        for body in ["[1, 2, 3]", "[]", r#"[[],"test.echo",{"FOO":"bar"}]"#, "\"ok\"", "null"] {
            let (_, transport) = recording(body);
            let err = dispatcher(transport).send("test.echo", &Params::new()).unwrap_err();
            assert!(matches!(err, ApiError::Parse(_)), "{body}: {err:?}");
        }
    }

    #[test]
    fn object_without_error_array_is_parse_error() {
        for body in ["{}", r#"{"error":"upstream unavailable"}"#, r#"{"DATA":{"FOO":"bar"}}"#] {
            let (_, transport) = recording(body);
            let err = dispatcher(transport).send("test.echo", &Params::new()).unwrap_err();
            assert!(matches!(err, ApiError::Parse(_)), "{body}: {err:?}");
        }
    }

    #[test]
    fn transport_failure_is_passed_through() {
        let transport = |_: HttpRequest| -> Result<HttpResponse, TransportError> {
            Err("connection refused".into())
        };
        let err = dispatcher(Arc::new(transport))
            .send("test.echo", &Params::new())
            .unwrap_err();
        match err {
            ApiError::Transport(source) => assert_eq!(source.to_string(), "connection refused"),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn status_code_is_not_interpreted() {
        let transport = |_: HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 500,
                body: ECHO_BODY.to_string(),
            })
        };
        let result = dispatcher(Arc::new(transport))
            .send("test.echo", &Params::new())
            .unwrap();
        assert_eq!(result.get("foo").and_then(Value::as_str), Some("bar"));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let (_, transport) = recording(ECHO_BODY);
        let rendered = format!("{:?}", dispatcher(transport));
        assert!(!rendered.contains("foo"));
        assert!(rendered.contains("https://fake.linode.com/"));
    }
}
