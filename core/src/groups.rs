//! Operation groups: thin namespaces over `RequestDispatcher::send`.
//!
//! Each group fixes the action names it calls and shares its client's
//! dispatcher, so it authenticates with the same key and endpoint.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::dispatch::{Params, RequestDispatcher};
use crate::error::ApiError;
use crate::response::Value;
use crate::types::{Datacenter, Distribution, Kernel, LinodePlan};

/// Diagnostic actions (`test.*`).
#[derive(Debug)]
pub struct Test {
    dispatcher: Arc<RequestDispatcher>,
}

impl Test {
    pub(crate) fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn api_key(&self) -> &str {
        self.dispatcher.api_key()
    }

    /// `test.echo`: the API answers with the parameters it received.
    pub fn echo(&self, params: &Params) -> Result<Value, ApiError> {
        self.dispatcher.send("test.echo", params)
    }
}

/// Availability listings (`avail.*`).
#[derive(Debug)]
pub struct Avail {
    dispatcher: Arc<RequestDispatcher>,
}

impl Avail {
    pub(crate) fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn api_key(&self) -> &str {
        self.dispatcher.api_key()
    }

    pub fn datacenters(&self) -> Result<Vec<Datacenter>, ApiError> {
        self.list("avail.datacenters")
    }

    pub fn distributions(&self) -> Result<Vec<Distribution>, ApiError> {
        self.list("avail.distributions")
    }

    pub fn kernels(&self) -> Result<Vec<Kernel>, ApiError> {
        self.list("avail.kernels")
    }

    pub fn linode_plans(&self) -> Result<Vec<LinodePlan>, ApiError> {
        self.list("avail.linodeplans")
    }

    fn list<T: DeserializeOwned>(&self, action: &str) -> Result<Vec<T>, ApiError> {
        self.dispatcher.send(action, &Params::new())?.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

    fn dispatcher_answering(data: &'static str) -> Arc<RequestDispatcher> {
        let transport: Arc<dyn Transport> =
            Arc::new(move |req: HttpRequest| -> Result<HttpResponse, TransportError> {
                let action = req.query_param("api_action").unwrap_or_default().to_string();
                Ok(HttpResponse {
                    status: 200,
                    body: format!(r#"{{"ERRORARRAY":[],"ACTION":"{action}","DATA":{data}}}"#),
                })
            });
        Arc::new(RequestDispatcher::new(&ClientConfig::new("foo"), transport).unwrap())
    }

    #[test]
    fn echo_returns_mapped_data() {
        let test = Test::new(dispatcher_answering(r#"{"FOO":"bar"}"#));
        let result = test.echo(&Params::new()).unwrap();
        assert_eq!(result.get("foo").and_then(Value::as_str), Some("bar"));
    }

    #[test]
    fn datacenters_decode_into_typed_list() {
        let avail = Avail::new(dispatcher_answering(
            r#"[{"DATACENTERID":2,"LOCATION":"Dallas, TX, USA","ABBR":"dallas"},
                {"DATACENTERID":6,"LOCATION":"Newark, NJ, USA","ABBR":"newark"}]"#,
        ));
        let dcs = avail.datacenters().unwrap();
        assert_eq!(dcs.len(), 2);
        assert_eq!(dcs[1].abbr, "newark");
    }

    #[test]
    fn unexpected_shape_is_decode_error() {
        let avail = Avail::new(dispatcher_answering(r#"{"NOT":"a list"}"#));
        assert!(matches!(avail.kernels(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn groups_report_the_dispatcher_key() {
        let dispatcher = dispatcher_answering("{}");
        assert_eq!(Test::new(Arc::clone(&dispatcher)).api_key(), "foo");
        assert_eq!(Avail::new(dispatcher).api_key(), "foo");
    }
}
