//! Area check service.
//!
//! The service answers one question: does the point `(x, y)` lie inside a
//! region scaled by `r`? Requests arrive from a web server over FastCGI,
//! configured via [`areacheck_config`]. Each evaluation is appended to the
//! history of the caller's session and the whole history is returned.
//!
//! The request path runs through three layers:
//!
//! 1. a [`Gateway`] yields one request at a time ([`FastCgiGateway`] in
//!    production);
//! 2. the [`ProtocolAdapter`] decodes the request, checks the point with
//!    [`CoordinateValidator`], evaluates [`is_in_region`] and records the
//!    outcome in a [`SessionStore`];
//! 3. the resulting [`HttpResponse`] is framed by hand and written back
//!    through the gateway by the [`RequestLoop`].
//!
//! ## Region
//!
//! For scale `r` the region joins a quarter disk of radius `r` (`x, y ≥ 0`),
//! the rectangle `[0, r] × [-r/2, 0]` and the triangle above
//! `x + y = -r/2` (`x, y ≤ 0`). Points with `x < 0` and `y > 0` are outside.
//! See [`geometry`] for the boundary rules.
//!
//! Lifecycle events are emitted through a [`HealthReporter`];
//! [`run_server`] wires the production collaborators together and blocks
//! until a termination signal arrives.

mod bootstrap;
mod dispatch;
mod evaluation;
mod gateway;
pub mod geometry;
mod health;
mod process;
mod server;
mod session;
mod telemetry;
mod validation;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Service, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{
    BodyEncoding, HttpResponse, Method, ProtocolAdapter, ProtocolError, RawSubmission, Status,
    normalise_decimal, parse_decimal,
};
pub use evaluation::{CoordinateTriple, EvaluationResult, current_timestamp};
pub use gateway::{
    CONTENT_LENGTH, CONTENT_TYPE, FastCgiGateway, Gateway, GatewayError, GatewayRequest,
    ListenerError, QUERY_STRING, REQUEST_METHOD, SCRIPT_NAME,
};
pub use geometry::is_in_region;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server};
pub use server::{LoopSummary, RequestLoop};
pub use session::{InMemorySessionStore, SessionId, SessionStore};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use validation::CoordinateValidator;

#[cfg(test)]
mod tests;
