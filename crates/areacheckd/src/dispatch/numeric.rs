//! Locale-tolerant decimal parsing.
//!
//! Front ends in comma-decimal locales submit `1,5` for one and a half, so a
//! comma is normalised to a point before standard parsing.

use std::borrow::Cow;

use super::errors::ProtocolError;

/// Trims `raw` and replaces any `,` with `.`.
#[must_use]
pub fn normalise_decimal(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if trimmed.contains(',') {
        Cow::Owned(trimmed.replace(',', "."))
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Parses a coordinate after normalisation.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidNumber`] when the normalised text is not a
/// decimal number.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, ProtocolError> {
    normalise_decimal(raw)
        .parse::<f64>()
        .map_err(|_| ProtocolError::invalid_number(field, raw))
}
