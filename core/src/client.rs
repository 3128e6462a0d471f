//! Top-level handle to the Linode API.
//!
//! # Design
//! `Client` owns the validated configuration and one `RequestDispatcher`
//! shared with every operation group. Groups are created on first access
//! and kept for the client's lifetime; `OnceLock` makes that creation happen
//! exactly once even when a single client is shared between threads, so two
//! calls to `client.test()` always return the same instance.

use std::sync::{Arc, OnceLock};

use crate::config::ClientConfig;
use crate::dispatch::{Params, RequestDispatcher};
use crate::error::ApiError;
use crate::groups::{Avail, Test};
use crate::http::{Transport, UreqTransport};
use crate::response::Value;

#[derive(Debug)]
pub struct Client {
    config: ClientConfig,
    dispatcher: Arc<RequestDispatcher>,
    test: OnceLock<Test>,
    avail: OnceLock<Avail>,
}

impl Client {
    /// Build a client that talks HTTP through `UreqTransport`.
    ///
    /// Fails with `ApiError::Configuration` when the API key is missing.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Build a client from `LINODE_API_KEY` / `LINODE_API_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build a client that sends every request through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self, ApiError> {
        let dispatcher = RequestDispatcher::new(&config, Arc::new(transport))?;
        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
            test: OnceLock::new(),
            avail: OnceLock::new(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub fn api_url(&self) -> &str {
        self.config.api_url()
    }

    /// Send `action` directly, bypassing the operation groups.
    pub fn send_request(&self, action: &str, params: &Params) -> Result<Value, ApiError> {
        self.dispatcher.send(action, params)
    }

    pub fn test(&self) -> &Test {
        self.test.get_or_init(|| Test::new(Arc::clone(&self.dispatcher)))
    }

    pub fn avail(&self) -> &Avail {
        self.avail.get_or_init(|| Avail::new(Arc::clone(&self.dispatcher)))
    }
}
