//! Request line interpretation: method, route, query string and body.

use url::form_urlencoded;

use crate::gateway::{CONTENT_LENGTH, GatewayRequest, QUERY_STRING, REQUEST_METHOD, SCRIPT_NAME};

use super::errors::ProtocolError;

/// Largest body the adapter will decode.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Methods the adapter serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// History fetch.
    Get,
    /// Evaluate and append.
    Post,
}

impl Method {
    /// Reads `REQUEST_METHOD`. Names are matched exactly as sent.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnsupportedMethod`] for any other or a
    /// missing method.
    pub fn from_request(request: &GatewayRequest) -> Result<Self, ProtocolError> {
        match request.param(REQUEST_METHOD) {
            Some("GET") => Ok(Self::Get),
            Some("POST") => Ok(Self::Post),
            other => Err(ProtocolError::unsupported_method(other)),
        }
    }

    /// Canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Checks that the request targets `script_name`.
pub(crate) fn check_route(request: &GatewayRequest, script_name: &str) -> Result<(), ProtocolError> {
    match request.param(SCRIPT_NAME) {
        Some(target) if target == script_name => Ok(()),
        other => Err(ProtocolError::not_found(other)),
    }
}

/// Returns the first value of `name` in the URL-decoded query string.
pub(crate) fn query_value(request: &GatewayRequest, name: &str) -> Option<String> {
    let query = request.param(QUERY_STRING)?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Returns the body limited to the declared `CONTENT_LENGTH`.
///
/// A missing or unparseable length yields an empty body. When the gateway
/// delivered fewer bytes than declared, all delivered bytes are returned.
pub(crate) fn declared_body(request: &GatewayRequest) -> Result<&[u8], ProtocolError> {
    let declared = request
        .param(CONTENT_LENGTH)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if declared > MAX_BODY_BYTES {
        return Err(ProtocolError::BodyTooLarge {
            size: declared,
            max_size: MAX_BODY_BYTES,
        });
    }
    let body = request.body();
    Ok(body.get(..declared).unwrap_or(body))
}
