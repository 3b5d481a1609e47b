//! HTTP-over-gateway request handling.
//!
//! The adapter reads the method, target script, query string and body that a
//! gateway delivers, turns them into an evaluation or a history lookup, and
//! frames the JSON answer as a raw HTTP response.
//!
//! ## Protocol
//!
//! `POST` submits one point, either as JSON:
//!
//! ```json
//! {"X":"1","Y":"0.5","R":"2","sessionId":"abc"}
//! ```
//!
//! or as a form body (`xVal=1&yVal=0.5&rVal=2&sessionId=abc`). `GET` with
//! `?sessionId=abc` returns the history of that session. Both answer with:
//!
//! ```json
//! {"results":[{"x":1.0,"y":0.5,"r":2.0,"inArea":true,"currentTime":"2024-03-07 09:05:01","executionTime":0.012}]}
//! ```
//!
//! Rejected requests receive `400 Bad Request` with `{"error":"<message>"}`.

mod errors;
mod handler;
mod numeric;
mod payload;
mod request;
mod response;

pub use self::errors::ProtocolError;
pub use self::handler::ProtocolAdapter;
pub use self::numeric::{normalise_decimal, parse_decimal};
pub use self::payload::{BodyEncoding, RawSubmission};
pub use self::request::Method;
pub use self::response::{HttpResponse, Status};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
