//! Discrete value sets accepted by the coordinate validator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Finite set of values a coordinate may take.
///
/// On the command line and in the environment the set is written as a
/// comma-separated list (`-2,-1.5,0,1.5`); decimals must use `.` here. In a
/// configuration file it is a plain array of numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedValues(Vec<f64>);

impl AllowedValues {
    /// Builds a set from the given values, preserving their order.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self(values.into())
    }

    /// Values in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns true when the set holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when `value` lies within `tolerance` of a member.
    ///
    /// Non-finite values never match.
    #[must_use]
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value.is_finite()
            && self
                .0
                .iter()
                .any(|allowed| (value - allowed).abs() <= tolerance)
    }
}

impl fmt::Display for AllowedValues {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.0 {
            if !first {
                formatter.write_str(",")?;
            }
            first = false;
            write!(formatter, "{value}")?;
        }
        Ok(())
    }
}

impl FromStr for AllowedValues {
    type Err = AllowedValuesParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<f64>()
                    .map_err(|_| AllowedValuesParseError::InvalidNumber(item.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Errors raised while parsing an [`AllowedValues`] list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllowedValuesParseError {
    /// A list item was not a decimal number.
    #[error("'{0}' is not a decimal number")]
    InvalidNumber(String),
}
