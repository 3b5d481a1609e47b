//! POST body decoding.
//!
//! Two encodings are accepted, selected by the media type of
//! `CONTENT_TYPE`:
//!
//! - `application/json`: an object with `X`, `Y` and `R` (or lower-case
//!   `x`, `y`, `r`) holding strings or numbers, plus an optional `sessionId`;
//! - `application/x-www-form-urlencoded`: `xVal`, `yVal`, `rVal` and an
//!   optional `sessionId`.

use serde_json::{Map, Value};
use url::form_urlencoded;

use super::errors::ProtocolError;

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Body encodings the adapter decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// JSON object body.
    Json,
    /// URL form-encoded body.
    Form,
}

impl BodyEncoding {
    /// Selects the encoding from a `CONTENT_TYPE` value.
    ///
    /// Parameters such as `charset` are ignored and the media type is
    /// compared case-insensitively. A blank value counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingContentType`] or
    /// [`ProtocolError::UnsupportedContentType`].
    pub fn from_content_type(content_type: Option<&str>) -> Result<Self, ProtocolError> {
        let Some(raw) = content_type.filter(|value| !value.trim().is_empty()) else {
            return Err(ProtocolError::MissingContentType);
        };
        let media_type = raw.split(';').next().unwrap_or_default().trim();
        if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
            Ok(Self::Json)
        } else if media_type.eq_ignore_ascii_case(FORM_MEDIA_TYPE) {
            Ok(Self::Form)
        } else {
            Err(ProtocolError::unsupported_content_type(raw))
        }
    }
}

/// Coordinates as submitted, before numeric parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubmission {
    /// Submitted X text.
    pub x: Option<String>,
    /// Submitted Y text.
    pub y: Option<String>,
    /// Submitted R text.
    pub r: Option<String>,
    /// Submitted session id, untrimmed.
    pub session_id: Option<String>,
}

impl RawSubmission {
    /// Decodes `body` in the given encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidBody`] when a JSON body is malformed or
    /// not an object.
    pub fn decode(encoding: BodyEncoding, body: &[u8]) -> Result<Self, ProtocolError> {
        match encoding {
            BodyEncoding::Json => Self::from_json(body),
            BodyEncoding::Form => Ok(Self::from_form(body)),
        }
    }

    fn from_json(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|error| ProtocolError::invalid_body(error.to_string()))?;
        let Value::Object(object) = value else {
            return Err(ProtocolError::invalid_body("body is not a JSON object"));
        };
        Ok(Self {
            x: coordinate(&object, "X", "x"),
            y: coordinate(&object, "Y", "y"),
            r: coordinate(&object, "R", "r"),
            session_id: object
                .get("sessionId")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    fn from_form(body: &[u8]) -> Self {
        let mut submission = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "xVal" => &mut submission.x,
                "yVal" => &mut submission.y,
                "rVal" => &mut submission.r,
                "sessionId" => &mut submission.session_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        submission
    }

    /// Names of the coordinates that were not submitted.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [("x", &self.x), ("y", &self.y), ("r", &self.r)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Text of a coordinate stored under `upper` or `lower`.
///
/// Numbers are rendered as text so both representations share one parser;
/// `null` counts as absent and other JSON values are kept verbatim so that
/// they fail numeric parsing.
fn coordinate(object: &Map<String, Value>, upper: &str, lower: &str) -> Option<String> {
    let value = object
        .get(upper)
        .filter(|value| !value.is_null())
        .or_else(|| object.get(lower))?;
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
