//! Coordinate triples and the immutable results recorded for them.

use std::time::Duration;

use time::macros::format_description;
use time::{OffsetDateTime, format_description::BorrowedFormatItem};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Point under test together with the region scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTriple {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Region scale.
    pub r: f64,
}

impl CoordinateTriple {
    /// Builds a triple from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}

/// Outcome of evaluating one [`CoordinateTriple`].
///
/// Results are immutable once built; the session log owns them after they
/// have been appended.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    x: f64,
    y: f64,
    r: f64,
    in_area: bool,
    timestamp: String,
    evaluation_micros: f64,
}

impl EvaluationResult {
    /// Records an evaluation outcome.
    #[must_use]
    pub fn new(
        triple: CoordinateTriple,
        in_area: bool,
        timestamp: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            x: triple.x,
            y: triple.y,
            r: triple.r,
            in_area,
            timestamp: timestamp.into(),
            evaluation_micros: elapsed.as_secs_f64() * 1_000_000.0,
        }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Region scale.
    #[must_use]
    pub const fn r(&self) -> f64 {
        self.r
    }

    /// Whether the point was inside the region.
    #[must_use]
    pub const fn in_area(&self) -> bool {
        self.in_area
    }

    /// Wall-clock time of the evaluation as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Time spent parsing, validating and evaluating, in microseconds.
    #[must_use]
    pub const fn evaluation_micros(&self) -> f64 {
        self.evaluation_micros
    }

    /// Time spent parsing, validating and evaluating, in milliseconds.
    #[must_use]
    pub fn evaluation_millis(&self) -> f64 {
        self.evaluation_micros / 1_000.0
    }
}

/// Formats the current wall-clock time for a result.
///
/// Local time is preferred; when the local offset cannot be determined the
/// UTC time is used instead.
#[must_use]
pub fn current_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}

pub(crate) fn format_timestamp(moment: OffsetDateTime) -> String {
    moment
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| String::from("1970-01-01 00:00:00"))
}
