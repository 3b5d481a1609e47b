//! Test harness utilities shared by the service suites.

mod config_loader;
pub mod fastcgi_client;
mod gateway;
mod reporter;
mod shutdown;
mod world;

pub use config_loader::{FailingConfigLoader, InconsistentConfigLoader, TestConfigLoader};
pub use fastcgi_client::{ClientResponse, FastCgiClient};
pub use gateway::ScriptedGateway;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use shutdown::{FailingShutdownSignal, TestShutdownSignal};
pub use world::{TestWorld, world};

use crate::gateway::{CONTENT_LENGTH, CONTENT_TYPE, GatewayRequest, QUERY_STRING, REQUEST_METHOD, SCRIPT_NAME};

/// Script name used by every test configuration.
pub const TEST_SCRIPT: &str = "/fcgi-bin/areacheck";

/// Builds a POST request for the test script.
#[must_use]
pub fn post_request(content_type: &str, body: &str) -> GatewayRequest {
    GatewayRequest::default()
        .with_param(REQUEST_METHOD, "POST")
        .with_param(SCRIPT_NAME, TEST_SCRIPT)
        .with_param(CONTENT_TYPE, content_type)
        .with_param(CONTENT_LENGTH, body.len().to_string())
        .with_body(body.as_bytes().to_vec())
}

/// Builds a GET request for the test script.
#[must_use]
pub fn get_request(query: &str) -> GatewayRequest {
    GatewayRequest::default()
        .with_param(REQUEST_METHOD, "GET")
        .with_param(SCRIPT_NAME, TEST_SCRIPT)
        .with_param(QUERY_STRING, query)
}

/// JSON body submitting one point.
#[must_use]
pub fn point_json(x: &str, y: &str, r: &str, session: &str) -> String {
    format!(r#"{{"X":"{x}","Y":"{y}","R":"{r}","sessionId":"{session}"}}"#)
}
