//! Protocol adapter turning gateway requests into raw responses.
//!
//! [`ProtocolAdapter::handle`] never fails: every request produces exactly one
//! [`HttpResponse`]. Rejected requests leave the session store untouched.

use std::time::Instant;

use tracing::{debug, info, warn};

use areacheck_config::Config;

use crate::evaluation::{CoordinateTriple, EvaluationResult, current_timestamp};
use crate::geometry::is_in_region;
use crate::gateway::{CONTENT_TYPE, GatewayRequest};
use crate::session::{SessionId, SessionStore};
use crate::validation::CoordinateValidator;

use super::DISPATCH_TARGET;
use super::errors::ProtocolError;
use super::numeric::parse_decimal;
use super::payload::{BodyEncoding, RawSubmission};
use super::request::{Method, check_route, declared_body, query_value};
use super::response::HttpResponse;

const SESSION_PARAMETER: &str = "sessionId";

/// Decodes, validates and evaluates requests against a session store.
#[derive(Debug)]
pub struct ProtocolAdapter<S> {
    script_name: String,
    validator: CoordinateValidator,
    store: S,
}

impl<S: SessionStore> ProtocolAdapter<S> {
    /// Builds an adapter for the configured script name and value domain.
    #[must_use]
    pub fn new(config: &Config, store: S) -> Self {
        Self::with_validator(config.script_name(), CoordinateValidator::from_config(config), store)
    }

    /// Builds an adapter from explicit parts.
    #[must_use]
    pub fn with_validator(
        script_name: impl Into<String>,
        validator: CoordinateValidator,
        store: S,
    ) -> Self {
        Self {
            script_name: script_name.into(),
            validator,
            store,
        }
    }

    /// Session store the adapter appends to.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Produces the response for `request`.
    #[must_use]
    pub fn handle(&self, request: &GatewayRequest) -> HttpResponse {
        match self.dispatch(request) {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    kind = error.kind(),
                    detail = ?error,
                    "request rejected"
                );
                HttpResponse::error(&error)
            }
        }
    }

    fn dispatch(&self, request: &GatewayRequest) -> Result<HttpResponse, ProtocolError> {
        let method = Method::from_request(request)?;
        check_route(request, &self.script_name)?;
        debug!(target: DISPATCH_TARGET, method = method.as_str(), "dispatching request");
        match method {
            Method::Get => self.fetch_history(request),
            Method::Post => self.evaluate(request),
        }
    }

    fn fetch_history(&self, request: &GatewayRequest) -> Result<HttpResponse, ProtocolError> {
        let session_id = query_value(request, SESSION_PARAMETER)
            .as_deref()
            .and_then(SessionId::parse)
            .ok_or(ProtocolError::MissingSessionId)?;
        let history = self.store.history(&session_id);
        debug!(
            target: DISPATCH_TARGET,
            session = %session_id,
            entries = history.len(),
            "history served"
        );
        Ok(HttpResponse::success(&history, &session_id))
    }

    fn evaluate(&self, request: &GatewayRequest) -> Result<HttpResponse, ProtocolError> {
        let body = declared_body(request)?;
        let encoding = BodyEncoding::from_content_type(request.param(CONTENT_TYPE))?;
        let submission = RawSubmission::decode(encoding, body)?;
        let (Some(raw_x), Some(raw_y), Some(raw_r)) = (
            submission.x.as_deref(),
            submission.y.as_deref(),
            submission.r.as_deref(),
        ) else {
            return Err(ProtocolError::MissingParameters {
                missing: submission.missing_fields(),
            });
        };

        let started = Instant::now();
        let triple = CoordinateTriple::new(
            parse_decimal("x", raw_x)?,
            parse_decimal("y", raw_y)?,
            parse_decimal("r", raw_r)?,
        );
        if !self.validator.validate(&triple) {
            return Err(ProtocolError::InvalidData);
        }
        let in_area = is_in_region(triple.x, triple.y, triple.r);
        let result = EvaluationResult::new(triple, in_area, current_timestamp(), started.elapsed());

        let session_id = match submission.session_id.as_deref().and_then(SessionId::parse) {
            Some(session_id) => session_id,
            None => {
                let minted = SessionId::mint();
                info!(target: DISPATCH_TARGET, session = %minted, "session minted");
                minted
            }
        };
        self.store.append(&session_id, result);
        let history = self.store.history(&session_id);
        debug!(
            target: DISPATCH_TARGET,
            session = %session_id,
            in_area,
            entries = history.len(),
            "point evaluated"
        );
        Ok(HttpResponse::success(&history, &session_id))
    }
}
