//! Blocking client for the Linode HTTP API.
//!
//! # Overview
//! Every call is an HTTP `GET` to a single endpoint carrying `api_key`,
//! `api_action` and the action's parameters in the query string. The server
//! answers with an envelope `{ERRORARRAY, ACTION, DATA}`; a non-empty
//! `ERRORARRAY` fails the call, otherwise `DATA` is returned as a `Value`
//! whose object fields are reachable by their lower-cased names.
//!
//! # Design
//! - `RequestDispatcher` splits a call into `build_request` and
//!   `parse_response`, with a `Transport` in between doing the only I/O.
//! - `Client` validates configuration once and hands out memoized operation
//!   groups (`test()`, `avail()`) that share its dispatcher.
//! - Any `Fn(HttpRequest) -> Result<HttpResponse, TransportError>` is a
//!   transport, so tests stub the network with a closure.
//!
//! ```no_run
//! use linode_core::{Client, ClientConfig, Params, Value};
//!
//! # fn main() -> Result<(), linode_core::ApiError> {
//! let client = Client::new(ClientConfig::new("my-api-key"))?;
//! let mut params = Params::new();
//! params.insert("foo".to_string(), "bar".to_string());
//! let echoed = client.test().echo(&params)?;
//! assert_eq!(echoed.get("foo").and_then(Value::as_str), Some("bar"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod groups;
pub mod http;
pub mod response;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use dispatch::{Params, RequestDispatcher};
pub use error::{ApiError, RemoteError};
pub use groups::{Avail, Test};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use response::{wrap, ResponseObject, Value};
pub use types::{Datacenter, Distribution, Kernel, LinodePlan};
