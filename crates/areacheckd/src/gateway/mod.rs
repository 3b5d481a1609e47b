//! Process gateway abstraction.
//!
//! A gateway hands the request loop one request at a time and carries the
//! raw response back to the web server. [`FastCgiGateway`] implements the
//! FastCGI responder role over the configured socket endpoint.

mod errors;
mod fastcgi;
mod listener;
mod stream;

use std::collections::BTreeMap;

pub use self::errors::{GatewayError, ListenerError};
pub use self::fastcgi::FastCgiGateway;
pub(crate) use self::listener::SocketListener;
pub(crate) use self::stream::ConnectionStream;

const GATEWAY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::gateway");

/// Parameter carrying the request method.
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
/// Parameter carrying the declared body media type.
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
/// Parameter carrying the declared body length in bytes.
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
/// Parameter carrying the script path the request targets.
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
/// Parameter carrying the raw query string.
pub const QUERY_STRING: &str = "QUERY_STRING";

/// Source of requests and sink for their responses.
///
/// Implementations guarantee at most one request in flight: every request
/// returned by [`Gateway::accept`] is answered by exactly one call to
/// [`Gateway::respond`] before the next `accept`.
pub trait Gateway {
    /// Waits for the next request.
    ///
    /// Returns `Ok(None)` once no further requests will arrive, for example
    /// after a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when a request could not be read. The
    /// caller may keep accepting after an error.
    fn accept(&mut self) -> Result<Option<GatewayRequest>, GatewayError>;

    /// Writes the raw response for the request last accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the response could not be delivered.
    fn respond(&mut self, response: &[u8]) -> Result<(), GatewayError>;
}

/// Request parameters and body delivered by a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayRequest {
    params: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl GatewayRequest {
    /// Builds a request from its parameters and body bytes.
    #[must_use]
    pub fn new(params: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        Self { params, body }
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Looks up a parameter by exact name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All parameters, ordered by name.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Body bytes as received, before any `CONTENT_LENGTH` truncation.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
