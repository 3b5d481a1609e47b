//! Raw HTTP response framing.
//!
//! Responses are framed by hand: status line, `Content-Type`, a
//! `Content-Length` computed over the UTF-8 body bytes, CORS and session
//! headers on success, a blank line and the JSON body. All lines end in CRLF.

use serde::Serialize;
use tracing::error;

use crate::evaluation::EvaluationResult;
use crate::session::SessionId;

use super::DISPATCH_TARGET;
use super::errors::ProtocolError;

const CONTENT_TYPE: &str = "application/json; charset=UTF-8";
const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];
const SESSION_HEADER: &str = "X-Session-Id";

/// Error body sent when a payload cannot be serialised.
pub(crate) const FALLBACK_ERROR_BODY: &str = r#"{"error":"Internal error"}"#;

/// Status lines the adapter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `200 OK`.
    Ok,
    /// `400 Bad Request`.
    BadRequest,
}

impl Status {
    /// Numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
        }
    }

    const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
        }
    }
}

/// One entry of the `results` array.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultEntry<'a> {
    x: f64,
    y: f64,
    r: f64,
    in_area: bool,
    current_time: &'a str,
    execution_time: f64,
}

impl<'a> From<&'a EvaluationResult> for ResultEntry<'a> {
    fn from(result: &'a EvaluationResult) -> Self {
        Self {
            x: result.x(),
            y: result.y(),
            r: result.r(),
            in_area: result.in_area(),
            current_time: result.timestamp(),
            execution_time: result.evaluation_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultsBody<'a> {
    results: Vec<ResultEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Response ready to be framed and handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: Status,
    body: String,
    session_id: Option<SessionId>,
}

impl HttpResponse {
    /// Builds a `200 OK` response listing `history` for `session_id`.
    #[must_use]
    pub fn success(history: &[EvaluationResult], session_id: &SessionId) -> Self {
        let payload = ResultsBody {
            results: history.iter().map(ResultEntry::from).collect(),
        };
        match serde_json::to_string(&payload) {
            Ok(body) => Self {
                status: Status::Ok,
                body,
                session_id: Some(session_id.clone()),
            },
            Err(source) => {
                error!(
                    target: DISPATCH_TARGET,
                    error = %source,
                    session = %session_id,
                    "failed to serialise results"
                );
                Self::fallback()
            }
        }
    }

    /// Builds a `400 Bad Request` response carrying the public message of
    /// `error`.
    #[must_use]
    pub fn error(error: &ProtocolError) -> Self {
        let message = error.to_string();
        match serde_json::to_string(&ErrorBody { error: &message }) {
            Ok(body) => Self {
                status: Status::BadRequest,
                body,
                session_id: None,
            },
            Err(source) => {
                error!(
                    target: DISPATCH_TARGET,
                    error = %source,
                    "failed to serialise error body"
                );
                Self::fallback()
            }
        }
    }

    fn fallback() -> Self {
        Self {
            status: Status::BadRequest,
            body: String::from(FALLBACK_ERROR_BODY),
            session_id: None,
        }
    }

    /// Status of the response.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// JSON body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Session the response belongs to, set on success only.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Frames the response as raw bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {CONTENT_TYPE}\r\nContent-Length: {}\r\n",
            self.status.code(),
            self.status.reason(),
            self.body.len(),
        );
        if let Some(session_id) = self.session_id.as_ref() {
            for (name, value) in CORS_HEADERS {
                head.push_str(&format!("{name}: {value}\r\n"));
            }
            head.push_str(&format!("{SESSION_HEADER}: {session_id}\r\n"));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}
